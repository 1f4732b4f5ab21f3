//! `strata prune` — drops cache entries the current project can no longer
//! reproduce.

use std::collections::HashSet;

use strata_cache::{BuildCache, Lookup};
use strata_common::Fingerprint;
use strata_diagnostics::DiagnosticSink;
use strata_graph::BuildGraph;
use strata_source::SourceDb;

use crate::pipeline::{analyze, load_sources, render_report, resolve_project};
use crate::{GlobalArgs, PruneArgs, ReportFormat};

/// Runs the `strata prune` command.
pub fn run(args: &PruneArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = resolve_project(global)?;
    let sink = DiagnosticSink::new();
    let mut db = SourceDb::new();
    load_sources(&project_dir, &config, &mut db)?;

    let Some(graph) = analyze(&db, &config, &sink)? else {
        render_report(&sink, &db, ReportFormat::Text, global);
        return Ok(1);
    };

    let cache_dir = project_dir.join(&config.build.cache_dir);
    let mut cache = BuildCache::open(&cache_dir, env!("CARGO_PKG_VERSION"));

    let live = live_fingerprints(&graph, &cache);
    let removed = cache.prune(&live);
    if !args.dry_run {
        cache.persist()?;
    }

    if !global.quiet {
        let verb = if args.dry_run { "Would prune" } else { "Pruned" };
        eprintln!("   {verb} {removed} cache entries, {} kept", cache.len());
    }
    Ok(0)
}

/// Fingerprints of every transform reachable from the current sources by
/// following cache hits.
///
/// A transform's fingerprint needs the content hashes of all its inputs;
/// past the leaves those only come from recorded, still-verified cache
/// entries. Entries downstream of a miss cannot be matched to any current
/// transform and are treated as dead.
fn live_fingerprints(graph: &BuildGraph, cache: &BuildCache) -> HashSet<Fingerprint> {
    let mut hashes = graph.leaf_hashes();
    let mut live = HashSet::new();
    let mut pending: Vec<_> = graph.transform_ids().collect();
    loop {
        let before = pending.len();
        pending.retain(|&t| {
            let Some(fingerprint) = graph.fingerprint(t, &hashes) else {
                return true;
            };
            live.insert(fingerprint);
            if let Lookup::Hit(entry) = cache.lookup(fingerprint) {
                for &out in &graph.transform(t).outputs {
                    if let Some(rec) = entry.outputs.get(&graph.artifact(out).name) {
                        hashes.insert(out, rec.digest);
                    }
                }
            }
            false
        });
        if pending.len() == before {
            break;
        }
    }
    live
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_cache::entry_from_outputs;
    use strata_common::ContentHash;
    use strata_config::load_config_from_str;
    use strata_diagnostics::DiagnosticSink;

    fn graph_for(dir: &std::path::Path) -> (SourceDb, BuildGraph) {
        let mut db = SourceDb::new();
        db.add_source("a.f90", "program main\nend program\n".to_string());
        let toml = format!(
            "[project]\nname = \"t\"\nversion = \"0.1.0\"\n\n[build]\noutput-dir = \"{}\"\n\n\
             [tools.fortran-compiler]\ncommand = \"gfortran\"\n\n\
             [tools.linker]\ncommand = \"gfortran\"\n\n\
             [targets.app]\nentry = [\"main\"]\n",
            dir.display()
        );
        let config = load_config_from_str(&toml).unwrap();
        let sink = DiagnosticSink::new();
        let graph = analyze(&db, &config, &sink).unwrap().unwrap();
        (db, graph)
    }

    #[test]
    fn live_set_stops_at_cache_misses() {
        let dir = tempfile::tempdir().unwrap();
        let (_db, graph) = graph_for(dir.path());
        let cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");

        // with an empty cache only the compile, fed by leaves, is live
        let live = live_fingerprints(&graph, &cache);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn live_set_extends_through_recorded_entries() {
        let dir = tempfile::tempdir().unwrap();
        let (_db, graph) = graph_for(dir.path());
        let mut cache = BuildCache::open(&dir.path().join("cache"), "0.1.0");

        let hashes = graph.leaf_hashes();
        let compile = graph
            .transform_ids()
            .find(|&t| graph.fingerprint(t, &hashes).is_some())
            .unwrap();
        let fingerprint = graph.fingerprint(compile, &hashes).unwrap();

        let outputs: Vec<_> = graph
            .transform(compile)
            .outputs
            .iter()
            .map(|&out| {
                let artifact = graph.artifact(out);
                std::fs::create_dir_all(artifact.location.parent().unwrap()).unwrap();
                std::fs::write(&artifact.location, artifact.name.as_bytes()).unwrap();
                (
                    artifact.name.clone(),
                    ContentHash::from_bytes(artifact.name.as_bytes()),
                    artifact.location.clone(),
                )
            })
            .collect();
        cache.record(fingerprint, entry_from_outputs(outputs)).unwrap();

        // the link fingerprint becomes computable through the cached hashes
        let live = live_fingerprints(&graph, &cache);
        assert_eq!(live.len(), 2);
    }
}
