// Everpress - automated evergreen content pipeline
//
// Discovers candidate search queries from seed keywords, scores and
// classifies them, generates articles for the ones worth publishing, and
// keeps published posts fresh. Admission control (safety, quality, trust,
// dedup) lives in domains/*; external collaborators live behind kernel
// traits.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
