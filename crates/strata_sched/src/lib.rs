//! The build scheduler: walks the artifact graph in dependency order,
//! consulting the cache before every tool invocation.
//!
//! A single coordinator thread owns all scheduling state (produced hashes,
//! per-transform readiness, the cache) and dispatches work to a bounded pool
//! of worker threads over channels. Workers only run tools; every cache
//! lookup, record, and readiness update happens on the coordinator, so the
//! produced-state view is always consistent.

#![warn(missing_docs)]

pub mod report;
pub mod schedule;

pub use report::{BuildReport, TargetOutcome};
pub use schedule::run_build;
