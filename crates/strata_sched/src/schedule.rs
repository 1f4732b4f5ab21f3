//! The coordinator loop and worker pool.

use crate::report::{BuildReport, TargetOutcome};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Mutex};
use std::thread;
use strata_cache::{entry_from_outputs, BuildCache, Lookup};
use strata_common::{ContentHash, Fingerprint, ToolKind};
use strata_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use strata_graph::{ArtifactId, BuildGraph, TransformId};
use strata_source::{SourceDb, Span};
use strata_tools::{OutputSpec, ToolBox, ToolFailure, ToolInput, ToolOutputs};

/// One unit of work sent to a worker.
struct Job {
    transform: TransformId,
    tool: ToolKind,
    fingerprint: Fingerprint,
    inputs: Vec<ToolInput>,
    outputs: Vec<OutputSpec>,
}

/// What a worker sends back when a job completes.
struct JobResult {
    transform: TransformId,
    fingerprint: Fingerprint,
    result: Result<ToolOutputs, ToolFailure>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Running,
    Executed,
    CacheSkipped,
    Failed,
    Blocked,
}

/// Schedules every transform of the graph, returning the build summary.
///
/// Ready transforms (all inputs produced or leaves) are fingerprinted and
/// looked up in the cache; hits mark their outputs produced with the cached
/// digests, misses are dispatched to the worker pool. A tool failure marks
/// its transitive dependents blocked without disturbing independent
/// branches; transforms already running drain to completion. Diagnostics
/// for failures, blocked transforms, reproducibility conflicts, and stale
/// cache entries go to the sink.
pub fn run_build(
    graph: &BuildGraph,
    db: &SourceDb,
    toolbox: &ToolBox,
    cache: &mut BuildCache,
    sink: &DiagnosticSink,
    workers: usize,
) -> BuildReport {
    let worker_count = workers.max(1).min(graph.transform_count().max(1));
    let (job_tx, job_rx) = mpsc::channel::<Job>();
    let (result_tx, result_rx) = mpsc::channel::<JobResult>();
    let job_rx = Mutex::new(job_rx);

    thread::scope(|scope| {
        for _ in 0..worker_count {
            let result_tx = result_tx.clone();
            let job_rx = &job_rx;
            scope.spawn(move || worker_loop(job_rx, result_tx, toolbox));
        }
        coordinate(graph, db, cache, sink, job_tx, result_rx)
    })
}

fn worker_loop(jobs: &Mutex<Receiver<Job>>, results: Sender<JobResult>, toolbox: &ToolBox) {
    loop {
        let job = {
            let Ok(guard) = jobs.lock() else { return };
            guard.recv()
        };
        let Ok(job) = job else { return };
        let result = match toolbox.get(job.tool) {
            Some(tool) => tool.invoke(&job.inputs, &job.outputs),
            None => Err(ToolFailure {
                message: format!("no tool configured for kind '{}'", job.tool),
                stream: String::new(),
                location: None,
            }),
        };
        let sent = results.send(JobResult {
            transform: job.transform,
            fingerprint: job.fingerprint,
            result,
        });
        if sent.is_err() {
            return;
        }
    }
}

fn coordinate(
    graph: &BuildGraph,
    db: &SourceDb,
    cache: &mut BuildCache,
    sink: &DiagnosticSink,
    job_tx: Sender<Job>,
    result_rx: Receiver<JobResult>,
) -> BuildReport {
    let mut hashes = graph.leaf_hashes();
    let mut states: HashMap<TransformId, State> =
        graph.transform_ids().map(|t| (t, State::Pending)).collect();

    // inputs each transform is still waiting on
    let mut waiting: HashMap<TransformId, HashSet<ArtifactId>> = HashMap::new();
    let mut initial: Vec<TransformId> = Vec::new();
    for t in graph.transform_ids() {
        let missing: HashSet<ArtifactId> = graph
            .transform(t)
            .inputs
            .iter()
            .copied()
            .filter(|a| !hashes.contains_key(a))
            .collect();
        if missing.is_empty() {
            initial.push(t);
        }
        waiting.insert(t, missing);
    }
    initial.sort_by_key(|&t| label(graph, t));
    let mut ready: VecDeque<TransformId> = initial.into();

    let mut running = 0usize;
    loop {
        while let Some(t) = ready.pop_front() {
            if states[&t] != State::Pending {
                continue;
            }
            // ready transforms have every input hash, so this cannot be None
            let Some(fingerprint) = graph.fingerprint(t, &hashes) else {
                continue;
            };

            match cache.lookup(fingerprint) {
                Lookup::Hit(entry) => {
                    let transform = graph.transform(t);
                    let mut cached = Vec::with_capacity(transform.outputs.len());
                    let complete = transform.outputs.iter().all(|&out| {
                        match entry.outputs.get(&graph.artifact(out).name) {
                            Some(rec) => {
                                cached.push((out, rec.digest));
                                true
                            }
                            None => false,
                        }
                    });
                    if complete {
                        states.insert(t, State::CacheSkipped);
                        for (out, digest) in cached {
                            mark_produced(graph, out, digest, &mut hashes, &mut waiting, &mut ready, &states);
                        }
                        continue;
                    }
                }
                Lookup::Stale { output, location } => {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::CACHE_INTEGRITY,
                            format!("cached output '{output}' no longer matches its recorded digest"),
                            Span::DUMMY,
                        )
                        .with_note(format!("recorded at {}", location.display()))
                        .with_note(format!("re-running {}", label(graph, t))),
                    );
                }
                Lookup::Miss => {}
            }

            let transform = graph.transform(t);
            let inputs = transform
                .inputs
                .iter()
                .map(|&a| {
                    let artifact = graph.artifact(a);
                    ToolInput {
                        name: artifact.name.clone(),
                        location: artifact.location.clone(),
                    }
                })
                .collect();
            let outputs = transform
                .outputs
                .iter()
                .map(|&a| {
                    let artifact = graph.artifact(a);
                    OutputSpec {
                        name: artifact.name.clone(),
                        location: artifact.location.clone(),
                    }
                })
                .collect();
            let job = Job {
                transform: t,
                tool: transform.tool,
                fingerprint,
                inputs,
                outputs,
            };
            if job_tx.send(job).is_ok() {
                states.insert(t, State::Running);
                running += 1;
            } else {
                sink.emit(Diagnostic::error(
                    DiagnosticCode::TOOL_FAILURE,
                    format!("{}: worker pool shut down before dispatch", label(graph, t)),
                    Span::DUMMY,
                ));
                states.insert(t, State::Failed);
                block_dependents(graph, t, &mut states, sink);
            }
        }

        if running == 0 {
            break;
        }
        let Ok(done) = result_rx.recv() else { break };
        running -= 1;

        match done.result {
            Ok(produced) => {
                let entry = entry_from_outputs(
                    produced
                        .outputs
                        .iter()
                        .map(|o| (o.name.clone(), o.digest, o.location.clone())),
                );
                match cache.record(done.fingerprint, entry) {
                    Ok(()) => {
                        states.insert(done.transform, State::Executed);
                        for &out in &graph.transform(done.transform).outputs {
                            let name = &graph.artifact(out).name;
                            if let Some(output) = produced.outputs.iter().find(|o| &o.name == name) {
                                mark_produced(
                                    graph, out, output.digest, &mut hashes, &mut waiting, &mut ready, &states,
                                );
                            }
                        }
                    }
                    Err(err) => {
                        sink.emit(
                            Diagnostic::error(
                                DiagnosticCode::REPRODUCIBILITY,
                                format!("{}: {err}", label(graph, done.transform)),
                                Span::DUMMY,
                            )
                            .with_note("the original cache entry was kept"),
                        );
                        states.insert(done.transform, State::Failed);
                        block_dependents(graph, done.transform, &mut states, sink);
                    }
                }
            }
            Err(failure) => {
                sink.emit(failure_diagnostic(db, graph, done.transform, &failure));
                states.insert(done.transform, State::Failed);
                block_dependents(graph, done.transform, &mut states, sink);
            }
        }
    }

    // anything still pending lost an upstream output without being reached
    // by the dependent sweep (a tool broke its output contract), and anything
    // still running lost its worker
    let unfinished: Vec<TransformId> = states
        .iter()
        .filter(|(_, s)| matches!(s, State::Pending | State::Running))
        .map(|(&t, _)| t)
        .collect();
    for t in unfinished {
        states.insert(t, State::Blocked);
        sink.emit(Diagnostic::error(
            DiagnosticCode::BLOCKED,
            format!("{} not built: its inputs were never produced", label(graph, t)),
            Span::DUMMY,
        ));
    }

    let mut report = BuildReport::default();
    for (&t, &state) in &states {
        let name = label(graph, t);
        match state {
            State::Executed => report.executed.push(name),
            State::CacheSkipped => report.cache_skipped.push(name),
            State::Failed => report.failed.push(name),
            State::Blocked | State::Pending | State::Running => report.blocked.push(name),
        }
    }
    report.executed.sort();
    report.cache_skipped.sort();
    report.failed.sort();
    report.blocked.sort();
    for (name, &artifact) in graph.targets() {
        let outcome = if hashes.contains_key(&artifact) {
            TargetOutcome::Built(graph.artifact(artifact).location.clone())
        } else {
            TargetOutcome::Failed
        };
        report.targets.insert(name.clone(), outcome);
    }
    report
}

/// A transform's display name: the name of its first output artifact.
fn label(graph: &BuildGraph, id: TransformId) -> String {
    graph
        .transform(id)
        .outputs
        .first()
        .map(|&a| graph.artifact(a).name.clone())
        .unwrap_or_default()
}

/// Records an artifact's content hash and moves any transform whose inputs
/// are now all produced onto the ready queue.
fn mark_produced(
    graph: &BuildGraph,
    artifact: ArtifactId,
    digest: ContentHash,
    hashes: &mut HashMap<ArtifactId, ContentHash>,
    waiting: &mut HashMap<TransformId, HashSet<ArtifactId>>,
    ready: &mut VecDeque<TransformId>,
    states: &HashMap<TransformId, State>,
) {
    hashes.insert(artifact, digest);
    for consumer in graph.consumers(artifact) {
        if let Some(missing) = waiting.get_mut(&consumer) {
            missing.remove(&artifact);
            if missing.is_empty() && states.get(&consumer) == Some(&State::Pending) {
                ready.push_back(consumer);
            }
        }
    }
}

/// Marks every transform reachable downstream of a failure as blocked.
/// Transforms outside that cone are untouched and keep scheduling.
fn block_dependents(
    graph: &BuildGraph,
    failed: TransformId,
    states: &mut HashMap<TransformId, State>,
    sink: &DiagnosticSink,
) {
    let root = label(graph, failed);
    let mut stack = vec![failed];
    while let Some(t) = stack.pop() {
        for &out in &graph.transform(t).outputs {
            for consumer in graph.consumers(out) {
                if states.get(&consumer) == Some(&State::Pending) {
                    states.insert(consumer, State::Blocked);
                    sink.emit(
                        Diagnostic::error(
                            DiagnosticCode::BLOCKED,
                            format!("{} not built: a dependency failed", label(graph, consumer)),
                            Span::DUMMY,
                        )
                        .with_note(format!("blocked by the failure of {root}")),
                    );
                    stack.push(consumer);
                }
            }
        }
    }
}

/// Builds the tool-failure diagnostic, resolving the tool's reported
/// location back to a loaded source file when possible and carrying the
/// tool's diagnostic stream as notes.
fn failure_diagnostic(
    db: &SourceDb,
    graph: &BuildGraph,
    transform: TransformId,
    failure: &ToolFailure,
) -> Diagnostic {
    let span = failure
        .location
        .as_ref()
        .and_then(|loc| {
            let file = db.find_by_path(&loc.path)?;
            let start = file.line_start(loc.line)?;
            Some(Span::new(file.id, start, start))
        })
        .unwrap_or(Span::DUMMY);
    let mut diag = Diagnostic::error(
        DiagnosticCode::TOOL_FAILURE,
        format!("{}: {}", label(graph, transform), failure.message),
        span,
    );
    for line in failure.stream.lines().filter(|l| !l.trim().is_empty()) {
        diag = diag.with_note(line);
    }
    diag
}
