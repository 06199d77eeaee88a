//! Domain modules - business logic grouped by concern.

pub mod jobs;
pub mod keywords;
pub mod pipeline;
pub mod posts;
pub mod queries;
pub mod sources;
pub mod trust;
