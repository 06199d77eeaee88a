pub mod error;
pub mod sql;
pub mod utils;

pub use error::PipelineError;
