pub mod engine;
pub mod topics;

pub use engine::{AdmissionDecision, DiversityStats, TrustConfig, TrustContext, TrustEngine};
pub use topics::{canonical_topic_key, is_regulated_topic};
