use thiserror::Error;

/// Pipeline failure taxonomy.
///
/// Validation failures and blocked-content rejections are recorded per item
/// and never abort a batch; provider and database errors propagate.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed outline, failed quality gate, or failed trust check.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Classifier hard-block. A terminal admission decision, not a fault.
    #[error("content blocked: {0}")]
    Blocked(String),

    /// External provider call failed (suggestions, writer, CMS).
    #[error("provider error: {0}")]
    Provider(String),

    /// Database statement or transaction failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl PipelineError {
    /// Whether this failure should be isolated to the current item.
    pub fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            PipelineError::Validation(_) | PipelineError::Blocked(_) | PipelineError::Provider(_)
        )
    }
}
