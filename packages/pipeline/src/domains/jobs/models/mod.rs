pub mod job;

pub use job::{JobPhase, JobStatus, PipelineJob};
