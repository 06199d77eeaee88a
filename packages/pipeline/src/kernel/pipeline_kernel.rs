// PipelineKernel - core infrastructure with all dependencies
//
// The kernel holds everything the orchestrator needs (database pool and
// external collaborators) and provides access via traits for testability.
// Providers are injected here explicitly; nothing is resolved from global
// state.

use sqlx::PgPool;
use std::sync::Arc;

use super::{BasePublisher, BaseSuggestionProvider, BaseTrendSource, BaseWriter};

/// PipelineKernel holds all pipeline dependencies
pub struct PipelineKernel {
    pub db_pool: PgPool,
    pub suggestions: Arc<dyn BaseSuggestionProvider>,
    pub writer: Arc<dyn BaseWriter>,
    pub publisher: Arc<dyn BasePublisher>,
    /// Optional best-effort trend source; absent means the strategy phase
    /// is a no-op.
    pub trends: Option<Arc<dyn BaseTrendSource>>,
}

impl PipelineKernel {
    pub fn new(
        db_pool: PgPool,
        suggestions: Arc<dyn BaseSuggestionProvider>,
        writer: Arc<dyn BaseWriter>,
        publisher: Arc<dyn BasePublisher>,
        trends: Option<Arc<dyn BaseTrendSource>>,
    ) -> Self {
        Self {
            db_pool,
            suggestions,
            writer,
            publisher,
            trends,
        }
    }
}
