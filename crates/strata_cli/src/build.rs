//! `strata build` — the full incremental build: load, extract, resolve,
//! graph, schedule, report.

use strata_cache::BuildCache;
use strata_config::ConfigError;
use strata_diagnostics::DiagnosticSink;
use strata_sched::{run_build, BuildReport, TargetOutcome};
use strata_source::SourceDb;
use strata_tools::ToolBox;

use crate::pipeline::{analyze, load_sources, render_report, resolve_project};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `strata build` command.
///
/// Returns exit code 0 only when every requested target builds; analysis
/// errors, tool failures, and blocked transforms all yield 1.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, mut config) = resolve_project(global)?;
    select_targets(&mut config, &args.targets)?;

    if !global.quiet {
        eprintln!(
            "  Building {} v{}",
            config.project.name, config.project.version
        );
        let names: Vec<&str> = config.targets.keys().map(|s| s.as_str()).collect();
        eprintln!("   Targets {}", names.join(", "));
    }

    let sink = DiagnosticSink::new();
    let mut db = SourceDb::new();
    load_sources(&project_dir, &config, &mut db)?;

    let Some(graph) = analyze(&db, &config, &sink)? else {
        render_report(&sink, &db, args.format, global);
        return Ok(1);
    };

    if !global.quiet {
        eprintln!("   Planned {} transforms", graph.transform_count());
    }

    let toolbox = ToolBox::from_config(&config);
    let cache_dir = project_dir.join(&config.build.cache_dir);
    let mut cache = BuildCache::open(&cache_dir, env!("CARGO_PKG_VERSION"));

    let workers = args.workers.unwrap_or(config.build.workers);
    let report = run_build(&graph, &db, &toolbox, &mut cache, &sink, workers);

    // successful transforms stay recorded even when the invocation fails
    cache.persist()?;

    render_report(&sink, &db, args.format, global);
    if !global.quiet {
        print_summary(&report);
    }

    if report.success() && !sink.has_errors() {
        Ok(0)
    } else {
        Ok(1)
    }
}

/// Restricts the configured target set to the ones named on the command
/// line. An unknown name is an error; an empty selection keeps them all.
fn select_targets(
    config: &mut strata_config::ProjectConfig,
    requested: &[String],
) -> Result<(), ConfigError> {
    if requested.is_empty() {
        return Ok(());
    }
    for name in requested {
        if !config.targets.contains_key(name) {
            return Err(ConfigError::UnknownTarget(name.clone()));
        }
    }
    config.targets.retain(|name, _| requested.contains(name));
    Ok(())
}

fn print_summary(report: &BuildReport) {
    eprintln!(
        "   Executed {} transform(s), {} from cache, {} failed, {} blocked",
        report.executed.len(),
        report.cache_skipped.len(),
        report.failed.len(),
        report.blocked.len(),
    );
    for (name, outcome) in &report.targets {
        match outcome {
            TargetOutcome::Built(location) => {
                eprintln!("   Finished {name} -> {}", location.display());
            }
            TargetOutcome::Failed => eprintln!("     FAILED {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::load_config_from_str;

    fn config_with_targets(names: &[&str]) -> strata_config::ProjectConfig {
        let mut toml = String::from(
            "[project]\nname = \"t\"\nversion = \"0.1.0\"\n\n[tools.linker]\ncommand = \"gfortran\"\n",
        );
        for name in names {
            toml.push_str(&format!("\n[targets.{name}]\nentry = [\"{name}\"]\n"));
        }
        load_config_from_str(&toml).unwrap()
    }

    #[test]
    fn select_targets_keeps_all_by_default() {
        let mut config = config_with_targets(&["atmos", "ocean"]);
        select_targets(&mut config, &[]).unwrap();
        assert_eq!(config.targets.len(), 2);
    }

    #[test]
    fn select_targets_filters_to_requested() {
        let mut config = config_with_targets(&["atmos", "ocean"]);
        select_targets(&mut config, &["ocean".to_string()]).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert!(config.targets.contains_key("ocean"));
    }

    #[test]
    fn select_targets_rejects_unknown() {
        let mut config = config_with_targets(&["atmos"]);
        let err = select_targets(&mut config, &["land".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget(name) if name == "land"));
    }
}
