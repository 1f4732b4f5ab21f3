//! Builds the artifact/transform DAG from resolved file dependencies.
//!
//! Each target's entry symbols root a reachable sub-tree; files outside
//! every sub-tree get no artifacts at all. Reachable files expand into
//! preprocess, generate, compile, and link transforms according to their
//! source kind.

use crate::artifact::{Artifact, ArtifactKind};
use crate::error::GraphError;
use crate::graph::{ArtifactId, BuildGraph, Node, TransformId};
use crate::transform::Transform;
use petgraph::graph::DiGraph;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use strata_common::{ContentHash, Fingerprint, FingerprintBuilder, ToolKind};
use strata_config::{ProjectConfig, TargetKind};
use strata_resolve::{FileDeps, Resolution};
use strata_source::{SourceDb, SourceKind};

/// Builds the full build graph for every configured target.
pub fn build_graph(
    db: &SourceDb,
    resolution: &Resolution,
    config: &ProjectConfig,
) -> Result<BuildGraph, GraphError> {
    let mut extra_roots = Vec::new();
    for symbol in &config.source.unreferenced_dependencies {
        let path = resolution
            .providers
            .get(&symbol.to_ascii_lowercase())
            .ok_or_else(|| GraphError::UnknownSymbol {
                context: "unreferenced-dependencies".to_string(),
                symbol: symbol.clone(),
            })?;
        extra_roots.push(path.clone());
    }

    let mut target_closures: BTreeMap<&str, BTreeSet<PathBuf>> = BTreeMap::new();
    for (name, target) in &config.targets {
        let mut roots = extra_roots.clone();
        for symbol in &target.entry {
            let path = resolution
                .providers
                .get(&symbol.to_ascii_lowercase())
                .ok_or_else(|| GraphError::UnknownSymbol {
                    context: name.clone(),
                    symbol: symbol.clone(),
                })?;
            roots.push(path.clone());
        }
        target_closures.insert(name, closure(&roots, &resolution.deps));
    }

    let all_files: BTreeSet<&PathBuf> = target_closures.values().flatten().collect();
    check_cycles(&all_files, &resolution.deps)?;

    let mut builder = GraphBuilder::new(db, resolution, config);
    for &path in &all_files {
        builder.add_file(path)?;
    }
    for (name, files) in &target_closures {
        builder.add_link(name, files)?;
    }
    Ok(builder.finish())
}

/// The transitive dependency closure of a set of root files.
fn closure(roots: &[PathBuf], deps: &FileDeps) -> BTreeSet<PathBuf> {
    let mut seen = BTreeSet::new();
    let mut stack = roots.to_vec();
    while let Some(path) = stack.pop() {
        if seen.insert(path.clone()) {
            if let Some(targets) = deps.get(&path) {
                stack.extend(targets.iter().cloned());
            }
        }
    }
    seen
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first cycle check over the reachable file dependencies, reporting
/// the full cycle path.
fn check_cycles(files: &BTreeSet<&PathBuf>, deps: &FileDeps) -> Result<(), GraphError> {
    let mut marks: HashMap<&Path, Mark> = HashMap::new();
    let mut trail: Vec<PathBuf> = Vec::new();
    for &file in files {
        visit(file, deps, &mut marks, &mut trail)?;
    }
    Ok(())
}

fn visit<'a>(
    file: &'a PathBuf,
    deps: &'a FileDeps,
    marks: &mut HashMap<&'a Path, Mark>,
    trail: &mut Vec<PathBuf>,
) -> Result<(), GraphError> {
    match marks.get(file.as_path()) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            let start = trail.iter().position(|p| p == file).unwrap_or(0);
            return Err(GraphError::Cycle {
                path: trail[start..].to_vec(),
            });
        }
        None => {}
    }
    marks.insert(file, Mark::InProgress);
    trail.push(file.clone());
    if let Some(targets) = deps.get(file) {
        for dep in targets {
            visit(dep, deps, marks, trail)?;
        }
    }
    trail.pop();
    marks.insert(file, Mark::Done);
    Ok(())
}

struct GraphBuilder<'a> {
    db: &'a SourceDb,
    resolution: &'a Resolution,
    graph: DiGraph<Node, ()>,
    by_name: HashMap<String, ArtifactId>,
    targets: BTreeMap<String, ArtifactId>,
    output_dir: PathBuf,
    tool_fingerprints: HashMap<ToolKind, Fingerprint>,
    config: &'a ProjectConfig,
}

impl<'a> GraphBuilder<'a> {
    fn new(db: &'a SourceDb, resolution: &'a Resolution, config: &'a ProjectConfig) -> Self {
        Self {
            db,
            resolution,
            graph: DiGraph::new(),
            by_name: HashMap::new(),
            targets: BTreeMap::new(),
            output_dir: config.build.output_dir.clone(),
            tool_fingerprints: HashMap::new(),
            config,
        }
    }

    fn ensure_artifact(
        &mut self,
        name: String,
        kind: ArtifactKind,
        location: PathBuf,
        leaf_hash: Option<ContentHash>,
    ) -> ArtifactId {
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = ArtifactId(self.graph.add_node(Node::Artifact(Artifact {
            name: name.clone(),
            kind,
            location,
            leaf_hash,
        })));
        self.by_name.insert(name, id);
        id
    }

    fn add_transform(
        &mut self,
        tool: ToolKind,
        inputs: Vec<ArtifactId>,
        outputs: Vec<ArtifactId>,
    ) -> Result<TransformId, GraphError> {
        let config_fingerprint = self.tool_config_fingerprint(tool)?;
        // each artifact has at most one producer; a second producer means
        // two files map to the same output name
        for output in &outputs {
            if self
                .graph
                .neighbors_directed(output.0, petgraph::Direction::Incoming)
                .next()
                .is_some()
            {
                let name = match &self.graph[output.0] {
                    Node::Artifact(artifact) => artifact.name.clone(),
                    Node::Transform(_) => unreachable!("outputs are artifacts"),
                };
                return Err(GraphError::DuplicateProducer { name });
            }
        }
        let id = TransformId(self.graph.add_node(Node::Transform(Transform {
            tool,
            inputs: inputs.clone(),
            outputs: outputs.clone(),
            config_fingerprint,
        })));
        for input in inputs {
            self.graph.add_edge(input.0, id.0, ());
        }
        for output in outputs {
            self.graph.add_edge(id.0, output.0, ());
        }
        Ok(id)
    }

    fn tool_config_fingerprint(&mut self, kind: ToolKind) -> Result<Fingerprint, GraphError> {
        if let Some(&fp) = self.tool_fingerprints.get(&kind) {
            return Ok(fp);
        }
        let tool = self
            .config
            .tool(kind)
            .ok_or(GraphError::MissingTool { kind })?;
        let mut builder = FingerprintBuilder::new();
        builder.fold_str(&tool.command);
        for flag in &tool.flags {
            builder.fold_str(flag);
        }
        let fp = builder.finish();
        self.tool_fingerprints.insert(kind, fp);
        Ok(fp)
    }

    fn source_artifact(&mut self, path: &Path) -> Result<ArtifactId, GraphError> {
        let file = self.db.find_by_path(path).ok_or_else(|| GraphError::UnknownFile {
            path: path.to_path_buf(),
        })?;
        // relative database paths resolve against the configured source
        // root; absolute paths pass through join unchanged
        let location = self.config.source.root.join(path);
        Ok(self.ensure_artifact(
            path.display().to_string(),
            ArtifactKind::Source,
            location,
            Some(file.content_hash),
        ))
    }

    fn object_artifact(&mut self, path: &Path) -> ArtifactId {
        let name = format!("obj/{}", path.with_extension("o").display());
        let location = self.output_dir.join(&name);
        self.ensure_artifact(name, ArtifactKind::CompiledObject, location, None)
    }

    fn interface_artifact(&mut self, path: &Path) -> ArtifactId {
        let name = format!("mod/{}", path.with_extension("mod").display());
        let location = self.output_dir.join(&name);
        self.ensure_artifact(name, ArtifactKind::ModuleInterface, location, None)
    }

    /// Compile-time inputs contributed by a file's dependencies: module
    /// interfaces of Fortran deps and the text of header/include deps.
    /// Objects of C deps are link-time only.
    fn dependency_inputs(&mut self, path: &Path) -> Result<Vec<ArtifactId>, GraphError> {
        let mut inputs = Vec::new();
        if let Some(deps) = self.resolution.deps.get(path) {
            for dep in deps {
                let kind = self
                    .db
                    .find_by_path(dep)
                    .ok_or_else(|| GraphError::UnknownFile { path: dep.clone() })?
                    .kind;
                match kind {
                    SourceKind::FortranFree
                    | SourceKind::FortranPreprocess
                    | SourceKind::KernelGen => inputs.push(self.interface_artifact(dep)),
                    SourceKind::CHeader | SourceKind::FortranInclude => {
                        inputs.push(self.source_artifact(dep)?);
                    }
                    SourceKind::C => {}
                }
            }
        }
        Ok(inputs)
    }

    fn add_file(&mut self, path: &Path) -> Result<(), GraphError> {
        let kind = self
            .db
            .find_by_path(path)
            .ok_or_else(|| GraphError::UnknownFile {
                path: path.to_path_buf(),
            })?
            .kind;
        let source = self.source_artifact(path)?;

        match kind {
            SourceKind::FortranFree => {
                let mut inputs = vec![source];
                inputs.extend(self.dependency_inputs(path)?);
                let outputs = vec![self.object_artifact(path), self.interface_artifact(path)];
                self.add_transform(ToolKind::FortranCompiler, inputs, outputs)?;
            }
            SourceKind::FortranPreprocess => {
                let pp_name = format!("pp/{}", path.with_extension("f90").display());
                let pp_location = self.output_dir.join(&pp_name);
                let preprocessed = self.ensure_artifact(
                    pp_name,
                    ArtifactKind::PreprocessedSource,
                    pp_location,
                    None,
                );
                self.add_transform(ToolKind::Preprocessor, vec![source], vec![preprocessed])?;

                let mut inputs = vec![preprocessed];
                inputs.extend(self.dependency_inputs(path)?);
                let outputs = vec![self.object_artifact(path), self.interface_artifact(path)];
                self.add_transform(ToolKind::FortranCompiler, inputs, outputs)?;
            }
            SourceKind::KernelGen => {
                // generation depends on the text of the kernel modules, so
                // a kernel change regenerates the algorithm/kernel pair
                let mut gen_inputs = vec![source];
                if let Some(deps) = self.resolution.deps.get(path) {
                    for dep in deps {
                        gen_inputs.push(self.source_artifact(dep)?);
                    }
                }
                let gen_name = format!("gen/{}", path.with_extension("f90").display());
                let gen_location = self.output_dir.join(&gen_name);
                let generated = self.ensure_artifact(
                    gen_name,
                    ArtifactKind::GeneratedSource,
                    gen_location,
                    None,
                );
                self.add_transform(ToolKind::KernelGenerator, gen_inputs, vec![generated])?;

                let mut inputs = vec![generated];
                inputs.extend(self.dependency_inputs(path)?);
                let outputs = vec![self.object_artifact(path), self.interface_artifact(path)];
                self.add_transform(ToolKind::FortranCompiler, inputs, outputs)?;
            }
            SourceKind::C => {
                let mut inputs = vec![source];
                inputs.extend(self.dependency_inputs(path)?);
                let outputs = vec![self.object_artifact(path)];
                self.add_transform(ToolKind::CCompiler, inputs, outputs)?;
            }
            SourceKind::CHeader | SourceKind::FortranInclude => {}
        }
        Ok(())
    }

    fn add_link(&mut self, name: &str, files: &BTreeSet<PathBuf>) -> Result<(), GraphError> {
        let target = &self.config.targets[name];
        let mut inputs = Vec::new();
        for path in files {
            let kind = self
                .db
                .find_by_path(path)
                .ok_or_else(|| GraphError::UnknownFile { path: path.clone() })?
                .kind;
            if kind.is_compiled() {
                inputs.push(self.object_artifact(path));
            }
        }
        for archive in &target.archives {
            let bytes = std::fs::read(archive).map_err(|source| GraphError::ArchiveUnreadable {
                path: archive.clone(),
                source,
            })?;
            inputs.push(self.ensure_artifact(
                archive.display().to_string(),
                ArtifactKind::Source,
                archive.clone(),
                Some(ContentHash::from_bytes(&bytes)),
            ));
        }

        let (tool, out_name, out_kind) = match target.kind {
            TargetKind::Executable => (
                ToolKind::Linker,
                format!("bin/{name}"),
                ArtifactKind::LinkedExecutable,
            ),
            TargetKind::Library => (
                ToolKind::Archiver,
                format!("lib/lib{name}.a"),
                ArtifactKind::LinkedLibrary,
            ),
        };
        let location = self.output_dir.join(&out_name);
        let output = self.ensure_artifact(out_name, out_kind, location, None);
        self.add_transform(tool, inputs, vec![output])?;
        self.targets.insert(name.to_string(), output);
        Ok(())
    }

    fn finish(self) -> BuildGraph {
        let graph = BuildGraph {
            graph: self.graph,
            targets: self.targets,
        };
        debug_assert!(!petgraph::algo::is_cyclic_directed(&graph.graph));
        graph
    }
}
