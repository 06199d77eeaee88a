//! Kernel module - pipeline infrastructure and dependencies.

pub mod pipeline_kernel;
pub mod suggest_client;
pub mod testing;
pub mod traits;
pub mod trends_client;
pub mod wordpress_client;
pub mod writer_client;

pub use pipeline_kernel::PipelineKernel;
pub use suggest_client::SuggestClient;
pub use traits::{
    ArticleDraft, ArticleOutline, BasePublisher, BaseSuggestionProvider, BaseTrendSource,
    BaseWriter, PostPayload, PublishedPost, Suggestion,
};
pub use trends_client::TrendsClient;
pub use wordpress_client::WordPressClient;
pub use writer_client::WriterClient;
