//! Cycle driver - sequences the pipeline phases.
//!
//! A cycle is: best-effort trend discovery, then discovery, then publishing.
//! Refresh runs only when publishing produced nothing new, so stale posts
//! get attention exactly when the pipeline would otherwise sit idle.

use anyhow::Result;

use crate::config::PipelineConfig;
use crate::domains::posts::quality::QualityGate;
use crate::domains::queries::safety::{SafetyClassifier, SafetyPolicy};
use crate::domains::queries::scoring::QueryScorer;
use crate::domains::trust::engine::{TrustConfig, TrustEngine};
use crate::kernel::PipelineKernel;

use super::discovery::{run_discovery, run_trend_discovery};
use super::generation::run_generation;
use super::refresh::run_refresh;
use super::PhaseOutcome;

/// Outcome of one full cycle, phase by phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReport {
    pub trends: PhaseOutcome,
    pub discovery: PhaseOutcome,
    pub publishing: PhaseOutcome,
    pub refresh: PhaseOutcome,
}

pub struct Orchestrator {
    kernel: PipelineKernel,
    config: PipelineConfig,
    scorer: QueryScorer,
    classifier: SafetyClassifier,
    gate: QualityGate,
    trust: TrustEngine,
}

impl Orchestrator {
    /// Wire the domain components from one config. The kernel supplies the
    /// pool and external collaborators; everything else is built here.
    pub fn new(kernel: PipelineKernel, config: PipelineConfig) -> Self {
        let classifier = SafetyClassifier::new(SafetyPolicy {
            safe_topics_only: config.safe_topics_only,
            review_threshold: config.review_threshold,
        });
        let gate = QualityGate::new(config.min_h2_count, config.min_word_count);
        let trust = TrustEngine::new(TrustConfig {
            enabled: config.trust_checks_enabled,
            max_title_similarity: config.max_title_similarity,
            max_outline_overlap: config.max_outline_overlap,
            cluster_share_ceiling: config.cluster_share_ceiling,
            regulated_share_ceiling: config.regulated_share_ceiling,
            ramp_up_floor: config.diversity_ramp_up_floor,
            cooldown_minutes: config.publish_cooldown_minutes,
            ..TrustConfig::default()
        });

        Self {
            kernel,
            config,
            scorer: QueryScorer::new(),
            classifier,
            gate,
            trust,
        }
    }

    /// Run one full cycle. A failed phase is logged and the cycle moves on;
    /// earlier runs may have left work for later phases either way.
    pub async fn run_cycle(&self) -> Result<RunReport> {
        tracing::info!("Pipeline cycle starting");
        let mut report = RunReport::default();

        report.trends = run_trend_discovery(&self.kernel).await?;

        report.discovery =
            match run_discovery(&self.kernel, &self.scorer, &self.classifier, &self.config).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Continuing cycle past discovery failure: {e:#}");
                    PhaseOutcome::default()
                }
            };

        report.publishing =
            match run_generation(&self.kernel, &self.gate, &self.trust, &self.config).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Continuing cycle past publish failure: {e:#}");
                    PhaseOutcome::default()
                }
            };

        if report.publishing.succeeded == 0 {
            report.refresh = run_refresh(&self.kernel, &self.gate, &self.config).await?;
        }

        tracing::info!(
            "Pipeline cycle finished: {} discovered, {} published, {} refreshed",
            report.discovery.succeeded,
            report.publishing.succeeded,
            report.refresh.succeeded
        );
        Ok(report)
    }

    /// Discovery phases only, for backfilling the query backlog.
    pub async fn run_discovery_only(&self) -> Result<RunReport> {
        let mut report = RunReport::default();
        report.trends = run_trend_discovery(&self.kernel).await?;
        report.discovery =
            run_discovery(&self.kernel, &self.scorer, &self.classifier, &self.config).await?;
        Ok(report)
    }

    /// Refresh phase only, for catching up on stale posts.
    pub async fn run_refresh_only(&self) -> Result<RunReport> {
        let mut report = RunReport::default();
        report.refresh = run_refresh(&self.kernel, &self.gate, &self.config).await?;
        Ok(report)
    }
}
