//! Shared front-end steps: project resolution, source loading, extraction,
//! resolution, and graph construction, with analysis failures turned into
//! diagnostics.

use std::path::{Path, PathBuf};

use strata_common::Interner;
use strata_config::{load_config, load_config_from_str, ProjectConfig};
use strata_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticRenderer, DiagnosticSink, TerminalRenderer,
};
use strata_extract::{extract_all, ExtractionError};
use strata_graph::{build_graph, BuildGraph, GraphError};
use strata_resolve::{resolve, ResolveError};
use strata_source::{SourceDb, Span};

use crate::{GlobalArgs, ReportFormat};

/// Locates the project and loads its configuration.
///
/// With `--config` the named file is loaded and its parent directory is the
/// project root; otherwise `strata.toml` is read from the current directory.
pub fn resolve_project(
    global: &GlobalArgs,
) -> Result<(PathBuf, ProjectConfig), Box<dyn std::error::Error>> {
    match &global.config {
        Some(path) => {
            let path = Path::new(path);
            let text = std::fs::read_to_string(path)?;
            let config = load_config_from_str(&text)?;
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            // artifact locations are derived from loaded paths, so the
            // project directory must be absolute
            let dir = if dir.is_absolute() {
                dir
            } else {
                std::env::current_dir()?.join(dir)
            };
            Ok((dir, config))
        }
        None => {
            let dir = std::env::current_dir()?;
            let config = load_config(&dir)?;
            Ok((dir, config))
        }
    }
}

/// Loads the configured source tree into the database.
pub fn load_sources(
    project_dir: &Path,
    config: &ProjectConfig,
    db: &mut SourceDb,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = project_dir.join(&config.source.root);
    let skip_files: Vec<String> = config
        .source
        .skip_files
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    db.load_tree(&root, &skip_files)?;
    if db.is_empty() {
        return Err(format!("no source files found under {}", root.display()).into());
    }
    Ok(())
}

/// Runs extraction, resolution, and graph construction over loaded sources.
///
/// Analysis failures (extraction errors, duplicate or unresolved symbols,
/// dependency cycles) are emitted to the sink and yield `Ok(None)`; the
/// caller renders the sink and exits nonzero. Configuration-level failures
/// (unknown entry symbols, missing tools, unreadable archives) are returned
/// as plain errors.
pub fn analyze(
    db: &SourceDb,
    config: &ProjectConfig,
    sink: &DiagnosticSink,
) -> Result<Option<BuildGraph>, Box<dyn std::error::Error>> {
    let interner = Interner::new();
    let outcome = extract_all(db, &interner);
    if !outcome.errors.is_empty() {
        for err in &outcome.errors {
            sink.emit(extraction_diagnostic(db, err));
        }
        return Ok(None);
    }

    let resolution = match resolve(&outcome.facts, &interner, &config.source.external_symbols) {
        Ok(resolution) => resolution,
        Err(errors) => {
            for err in &errors {
                sink.emit(resolve_diagnostic(err));
            }
            return Ok(None);
        }
    };

    match build_graph(db, &resolution, config) {
        Ok(graph) => Ok(Some(graph)),
        Err(err @ GraphError::Cycle { .. }) => {
            sink.emit(Diagnostic::error(
                DiagnosticCode::GRAPH_CYCLE,
                err.to_string(),
                Span::DUMMY,
            ));
            Ok(None)
        }
        Err(other) => Err(other.into()),
    }
}

fn extraction_diagnostic(db: &SourceDb, err: &ExtractionError) -> Diagnostic {
    let span = db
        .find_by_path(&err.path)
        .and_then(|file| {
            let start = file.line_start(err.line)?;
            Some(Span::new(file.id, start, start))
        })
        .unwrap_or(Span::DUMMY);
    Diagnostic::error(DiagnosticCode::EXTRACTION, err.reason.clone(), span)
}

fn resolve_diagnostic(err: &ResolveError) -> Diagnostic {
    let code = match err {
        ResolveError::DuplicateDefinition { .. } => DiagnosticCode::DUPLICATE_DEFINITION,
        ResolveError::Unresolved { .. } => DiagnosticCode::UNRESOLVED_DEPENDENCY,
    };
    let diag = Diagnostic::error(code, err.to_string(), Span::DUMMY);
    match err {
        ResolveError::Unresolved { .. } => diag.with_help(
            "if the symbol comes from a prebuilt archive, list it under [source] external-symbols",
        ),
        ResolveError::DuplicateDefinition { .. } => diag,
    }
}

/// Renders every collected diagnostic in the requested format.
pub fn render_report(
    sink: &DiagnosticSink,
    db: &SourceDb,
    format: ReportFormat,
    global: &GlobalArgs,
) {
    let diagnostics = sink.diagnostics();
    if diagnostics.is_empty() {
        return;
    }

    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new();
            for diag in &diagnostics {
                eprintln!("{}", renderer.render(diag, db));
            }
            if !global.quiet {
                eprintln!(
                    "   Result: {} error(s), {} warning(s)",
                    diagnostics.iter().filter(|d| d.severity.is_error()).count(),
                    diagnostics.iter().filter(|d| !d.severity.is_error()).count(),
                );
            }
        }
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&diagnostics).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}
