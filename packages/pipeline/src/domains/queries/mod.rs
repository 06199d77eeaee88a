pub mod models;
pub mod safety;
pub mod scoring;
