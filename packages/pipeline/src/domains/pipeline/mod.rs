//! Pipeline orchestration - phase runners and the cycle driver.
//!
//! Each phase records a job row around its work. Per-item failures are
//! counted and skipped; database failures fail the whole phase.

pub mod discovery;
pub mod generation;
pub mod orchestrator;
pub mod refresh;
pub mod stats;

pub use orchestrator::{Orchestrator, RunReport};
pub use stats::PipelineStats;

/// Counters a phase reports into its job row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub processed: i32,
    pub succeeded: i32,
    pub failed: i32,
}
