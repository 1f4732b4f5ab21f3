//! End-to-end scheduling properties: idempotence, incrementality, failure
//! isolation, cache integrity, and determinism, driven by scripted tools.

use std::path::Path;
use std::sync::atomic::Ordering;
use strata_cache::BuildCache;
use strata_common::{Interner, ToolKind};
use strata_diagnostics::DiagnosticSink;
use strata_graph::{build_graph, BuildGraph};
use strata_resolve::resolve;
use strata_sched::{run_build, BuildReport, TargetOutcome};
use strata_source::SourceDb;
use strata_tools::{ScriptedTool, ToolBox};

const TOOLING: &str = r#"
[tools.preprocessor]
command = "cpp"

[tools.fortran-compiler]
command = "gfortran"
flags = ["-c"]

[tools.c-compiler]
command = "gcc"
flags = ["-c"]

[tools.kernel-generator]
command = "psyclone"

[tools.archiver]
command = "ar"

[tools.linker]
command = "gfortran"
"#;

fn pipeline(dir: &Path, sources: &[(&str, &str)], targets: &str) -> (SourceDb, BuildGraph) {
    let mut db = SourceDb::new();
    for (name, content) in sources {
        // on disk for the tools, in the database for analysis
        std::fs::write(dir.join(name), content).unwrap();
        db.add_source(*name, content.to_string());
    }
    let interner = Interner::new();
    let outcome = strata_extract::extract_all(&db, &interner);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    let resolution = resolve(&outcome.facts, &interner, &[]).unwrap();
    let toml = format!(
        "[project]\nname = \"t\"\nversion = \"0.1.0\"\n\n[source]\nroot = \"{dir}\"\n\n[build]\noutput-dir = \"{dir}\"\n{TOOLING}\n{targets}",
        dir = dir.display()
    );
    let config = strata_config::load_config_from_str(&toml).unwrap();
    let graph = build_graph(&db, &resolution, &config).unwrap();
    (db, graph)
}

fn toolbox_of(tool: &ScriptedTool) -> ToolBox {
    let mut toolbox = ToolBox::new();
    for kind in [
        ToolKind::Preprocessor,
        ToolKind::FortranCompiler,
        ToolKind::CCompiler,
        ToolKind::KernelGenerator,
        ToolKind::Archiver,
        ToolKind::Linker,
    ] {
        toolbox.insert(kind, Box::new(tool.clone()));
    }
    toolbox
}

fn build(
    db: &SourceDb,
    graph: &BuildGraph,
    toolbox: &ToolBox,
    cache: &mut BuildCache,
) -> (BuildReport, DiagnosticSink) {
    let sink = DiagnosticSink::new();
    let report = run_build(graph, db, toolbox, cache, &sink, 4);
    (report, sink)
}

#[test]
fn rebuild_without_changes_invokes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sources = [
        ("a.f90", "program main\nuse b\nend program\n"),
        ("b.f90", "module b\nend module\n"),
    ];
    let (db, graph) = pipeline(dir.path(), &sources, "[targets.app]\nentry = [\"main\"]\n");
    let tool = ScriptedTool::new();
    let toolbox = toolbox_of(&tool);
    let mut cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");

    let (first, _) = build(&db, &graph, &toolbox, &mut cache);
    assert!(first.success());
    assert_eq!(first.executed.len(), 3);
    let after_first = tool.counter().load(Ordering::SeqCst);

    let (second, sink) = build(&db, &graph, &toolbox, &mut cache);
    assert!(second.success());
    assert!(second.executed.is_empty());
    assert_eq!(second.cache_skipped.len(), 3);
    assert_eq!(tool.counter().load(Ordering::SeqCst), after_first);
    assert!(sink.diagnostics().is_empty());
}

#[test]
fn incremental_rebuild_limited_to_dependents() {
    let dir = tempfile::tempdir().unwrap();
    let (db, graph) = pipeline(
        dir.path(),
        &[
            ("a.f90", "program main\nuse b\nuse c\nend program\n"),
            ("b.f90", "module b\nend module\n"),
            ("c.f90", "module c\nend module\n"),
        ],
        "[targets.app]\nentry = [\"main\"]\n",
    );
    let tool = ScriptedTool::new();
    let toolbox = toolbox_of(&tool);
    let mut cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");
    let (first, _) = build(&db, &graph, &toolbox, &mut cache);
    assert!(first.success());
    assert_eq!(first.executed.len(), 4);

    // only b changes; c's compile must come from the cache
    let (db2, graph2) = pipeline(
        dir.path(),
        &[
            ("a.f90", "program main\nuse b\nuse c\nend program\n"),
            ("b.f90", "module b\ninteger :: extended\nend module\n"),
            ("c.f90", "module c\nend module\n"),
        ],
        "[targets.app]\nentry = [\"main\"]\n",
    );
    let (second, _) = build(&db2, &graph2, &toolbox, &mut cache);
    assert!(second.success());
    assert_eq!(second.executed, vec!["bin/app", "obj/a.o", "obj/b.o"]);
    assert_eq!(second.cache_skipped, vec!["obj/c.o"]);
}

#[test]
fn independent_target_survives_sibling_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (db, graph) = pipeline(
        dir.path(),
        &[
            ("xmain.f90", "program xmain\nuse bad_mod\nend program\n"),
            ("bad.f90", "module bad_mod\nend module\n"),
            ("ymain.f90", "program ymain\nend program\n"),
        ],
        "[targets.x]\nentry = [\"xmain\"]\n\n[targets.y]\nentry = [\"ymain\"]\n",
    );
    let ok = ScriptedTool::new();
    let mut toolbox = toolbox_of(&ok);
    toolbox.insert(
        ToolKind::FortranCompiler,
        Box::new(ScriptedTool::failing_on("bad.f90")),
    );
    let mut cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");

    let (report, sink) = build(&db, &graph, &toolbox, &mut cache);
    assert!(!report.success());
    assert_eq!(report.failed, vec!["obj/bad.o"]);
    assert_eq!(report.blocked, vec!["bin/x", "obj/xmain.o"]);
    assert_eq!(report.targets["x"], TargetOutcome::Failed);
    assert!(matches!(report.targets["y"], TargetOutcome::Built(_)));
    assert!(dir.path().join("bin/y").exists());

    let codes: Vec<String> = sink.diagnostics().iter().map(|d| d.code.to_string()).collect();
    assert_eq!(codes.iter().filter(|c| *c == "E401").count(), 1);
    assert!(codes.contains(&"E402".to_string()));
}

#[test]
fn tampered_output_detected_and_reexecuted() {
    let dir = tempfile::tempdir().unwrap();
    let (db, graph) = pipeline(
        dir.path(),
        &[("a.f90", "program main\nend program\n")],
        "[targets.app]\nentry = [\"main\"]\n",
    );
    let tool = ScriptedTool::new();
    let toolbox = toolbox_of(&tool);
    let mut cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");
    let (first, _) = build(&db, &graph, &toolbox, &mut cache);
    assert!(first.success());

    std::fs::write(dir.path().join("obj/a.o"), b"corrupted by hand").unwrap();

    let (second, sink) = build(&db, &graph, &toolbox, &mut cache);
    assert!(second.success());
    assert_eq!(second.executed, vec!["obj/a.o"]);
    assert_eq!(second.cache_skipped, vec!["bin/app"]);
    assert!(!sink.has_errors());
    let warnings: Vec<String> = sink.diagnostics().iter().map(|d| d.code.to_string()).collect();
    assert!(warnings.contains(&"W501".to_string()));
}

#[test]
fn fresh_builds_are_bit_identical() {
    let sources = [
        ("a.f90", "program main\nuse b\nend program\n"),
        ("b.f90", "module b\nend module\n"),
    ];
    let targets = "[targets.app]\nentry = [\"main\"]\n";

    let mut binaries = Vec::new();
    for _ in 0..2 {
        let dir = tempfile::tempdir().unwrap();
        let (db, graph) = pipeline(dir.path(), &sources, targets);
        let tool = ScriptedTool::new();
        let toolbox = toolbox_of(&tool);
        let mut cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");
        let (report, _) = build(&db, &graph, &toolbox, &mut cache);
        assert!(report.success());
        binaries.push(std::fs::read(dir.path().join("bin/app")).unwrap());
    }
    assert_eq!(binaries[0], binaries[1]);
}

#[test]
fn kernel_pipeline_generates_then_compiles() {
    let dir = tempfile::tempdir().unwrap();
    let (db, graph) = pipeline(
        dir.path(),
        &[
            (
                "alg.x90",
                "program alg\nuse kern_mod, only: kern\ncall invoke( kern(x) )\nend program\n",
            ),
            ("kern_mod.f90", "module kern_mod\nend module\n"),
        ],
        "[targets.app]\nentry = [\"alg\"]\n",
    );
    let tool = ScriptedTool::new();
    let toolbox = toolbox_of(&tool);
    let mut cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");

    let (report, _) = build(&db, &graph, &toolbox, &mut cache);
    assert!(report.success());
    assert!(report.executed.contains(&"gen/alg.f90".to_string()));
    assert!(report.executed.contains(&"obj/alg.o".to_string()));
    assert!(dir.path().join("gen/alg.f90").exists());
}
