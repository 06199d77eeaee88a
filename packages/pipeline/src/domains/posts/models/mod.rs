pub mod fingerprint;
pub mod post;
pub mod publish_log;

pub use fingerprint::ContentFingerprint;
pub use post::{Post, PostStatus, PublishedSummary};
pub use publish_log::{PublishAction, PublishLog};
