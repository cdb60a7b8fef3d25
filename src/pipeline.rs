//! Section pipeline: drives the eleven generators in a fixed order.
//!
//! Strictly sequential by design. The fixed order mirrors how the sections
//! read (financial modeling after pricing), but no data is threaded between
//! calls; every prompt sees only the original idea. Between sections the
//! pipeline pauses for the section's pacing delay to stay under upstream
//! rate limits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{IdealensError, Result};
use crate::fallback;
use crate::llm::TextGenerator;
use crate::parse::parse_section;
use crate::prompts::{build_prompt, SectionKind};
use crate::report::{Idea, ProgressEvent, Report, ReportDraft, StepStatus};
use crate::retry::{call_with_retry, RetryPolicy};

pub struct SectionPipeline {
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
    deadline: Duration,
}

impl SectionPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &PipelineConfig) -> Self {
        Self {
            generator,
            policy: RetryPolicy::new(config.retry_attempts, config.retry_base_ms),
            deadline: Duration::from_millis(config.deadline_ms),
        }
    }

    /// Run the full pipeline. Errors propagate; the caller decides whether
    /// to mask them with the fallback report.
    pub async fn run(&self, idea: &Idea) -> Result<Report> {
        match tokio::time::timeout(self.deadline, self.run_inner(idea, None)).await {
            Ok(result) => result,
            Err(_) => Err(IdealensError::Timeout {
                operation: "report generation".to_string(),
                timeout_ms: self.deadline.as_millis() as u64,
            }),
        }
    }

    /// Non-streaming entry point: upstream failures are fully masked by the
    /// fallback report. Returns the report and whether the fallback was used.
    pub async fn run_with_fallback(&self, idea: &Idea) -> (Report, bool) {
        match self.run(idea).await {
            Ok(report) => (report, false),
            Err(err) => {
                warn!(error = %err, "pipeline failed, serving fallback report");
                (fallback::fallback_report(&idea.title, &idea.description), true)
            }
        }
    }

    /// Streaming entry point: progress events flow into `events`, ending in
    /// exactly one terminal `complete` or `error` event.
    pub async fn run_streaming(&self, idea: Idea, events: mpsc::Sender<ProgressEvent>) {
        match tokio::time::timeout(self.deadline, self.run_inner(&idea, Some(&events))).await {
            Ok(Ok(report)) => {
                let _ = events.send(ProgressEvent::complete(report)).await;
            }
            Ok(Err(_)) => {
                // run_inner already emitted the terminal error event (or the
                // client went away, in which case nobody is listening).
            }
            Err(_) => {
                let err = IdealensError::Timeout {
                    operation: "report generation".to_string(),
                    timeout_ms: self.deadline.as_millis() as u64,
                };
                let _ = events
                    .send(ProgressEvent::error("report", 0, err.to_string()))
                    .await;
            }
        }
    }

    async fn run_inner(
        &self,
        idea: &Idea,
        events: Option<&mpsc::Sender<ProgressEvent>>,
    ) -> Result<Report> {
        if let Some(tx) = events {
            send_or_bail(tx, ProgressEvent::progress("report", 0, StepStatus::Starting)).await?;
        }

        let mut draft = ReportDraft::default();
        let mut percent = 0u8;

        for (index, kind) in SectionKind::ALL.into_iter().enumerate() {
            if let Some(tx) = events {
                send_or_bail(
                    tx,
                    ProgressEvent::progress(kind.label(), percent, StepStatus::Processing),
                )
                .await?;
            }

            if let Err(err) = self.generate_section(kind, idea, &mut draft).await {
                if let Some(tx) = events {
                    let _ = tx
                        .send(ProgressEvent::error(kind.label(), percent, err.to_string()))
                        .await;
                }
                return Err(err);
            }

            percent = kind.percent_after();
            debug!(section = %kind, percent, "section complete");
            if let Some(tx) = events {
                send_or_bail(
                    tx,
                    ProgressEvent::progress(kind.label(), percent, StepStatus::Complete),
                )
                .await?;
            }

            // Pacing pause between sections, skipped after the last one.
            if index + 1 < SectionKind::ALL.len() {
                tokio::time::sleep(Duration::from_millis(kind.pacing_delay_ms())).await;
            }
        }

        draft.finish(idea.clone())
    }

    async fn generate_section(
        &self,
        kind: SectionKind,
        idea: &Idea,
        draft: &mut ReportDraft,
    ) -> Result<()> {
        let prompt = build_prompt(kind, &idea.title, &idea.description);
        let raw = call_with_retry(&self.policy, || self.generator.generate(&prompt)).await?;

        match kind {
            SectionKind::ValidationScore => draft.validation_score = Some(parse_section(&raw)?),
            SectionKind::ImprovementSuggestions => {
                draft.improvement_suggestions = Some(parse_section(&raw)?)
            }
            SectionKind::CoreFeatures => draft.core_features = Some(parse_section(&raw)?),
            SectionKind::TechStack => draft.tech_stack = Some(parse_section(&raw)?),
            SectionKind::Pricing => draft.pricing = Some(parse_section(&raw)?),
            SectionKind::UserFlow => draft.user_flow = Some(parse_section(&raw)?),
            SectionKind::MvpKanban => draft.mvp_kanban = Some(parse_section(&raw)?),
            SectionKind::CompetitiveAnalysis => {
                draft.competitive_analysis = Some(parse_section(&raw)?)
            }
            SectionKind::FinancialModeling => {
                draft.financial_modeling = Some(parse_section(&raw)?)
            }
            SectionKind::LaunchRoadmap => draft.launch_roadmap = Some(parse_section(&raw)?),
            SectionKind::SimilarIdeas => draft.similar_ideas = Some(parse_section(&raw)?),
        }
        Ok(())
    }
}

/// The receiver going away means the client connection is gone; stop the
/// pipeline instead of generating sections nobody will see.
async fn send_or_bail(tx: &mpsc::Sender<ProgressEvent>, event: ProgressEvent) -> Result<()> {
    tx.send(event).await.map_err(|_| IdealensError::Internal {
        message: "progress stream closed by client".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CannedGenerator, LlmError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FailingGenerator {
        calls: AtomicU32,
        error: fn() -> LlmError,
    }

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.error)())
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            retry_attempts: 3,
            retry_base_ms: 1000,
            deadline_ms: 120_000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn canned_pipeline_produces_full_report() {
        let pipeline = SectionPipeline::new(Arc::new(CannedGenerator::new()), &test_config());
        let idea = Idea::new("Test", "Desc");
        let report = pipeline.run(&idea).await.unwrap();
        assert_eq!(report.idea.title, "Test");
        assert!(!report.core_features.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overloaded_generator_masks_into_fallback() {
        let generator = Arc::new(FailingGenerator {
            calls: AtomicU32::new(0),
            error: || LlmError::Overloaded("busy".into()),
        });
        let pipeline = SectionPipeline::new(generator.clone(), &test_config());
        let idea = Idea::new("Foo", "Bar");

        let (report, used_fallback) = pipeline.run_with_fallback(&idea).await;
        assert!(used_fallback);
        // First section retried to exhaustion, then the pipeline aborted.
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        assert!(report
            .core_features
            .iter()
            .any(|f| f.title == "Core Solution for Foo"));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_error_aborts_after_one_call() {
        let generator = Arc::new(FailingGenerator {
            calls: AtomicU32::new(0),
            error: || LlmError::Auth("bad key".into()),
        });
        let pipeline = SectionPipeline::new(generator.clone(), &test_config());
        let idea = Idea::new("Foo", "Bar");

        let err = pipeline.run(&idea).await.unwrap_err();
        assert!(matches!(err, IdealensError::Auth { .. }));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_surfaces_as_timeout() {
        let mut config = test_config();
        config.deadline_ms = 10;

        struct SlowGenerator;
        #[async_trait]
        impl TextGenerator for SlowGenerator {
            async fn generate(&self, _prompt: &str) -> std::result::Result<String, LlmError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("{}".to_string())
            }
        }

        let pipeline = SectionPipeline::new(Arc::new(SlowGenerator), &config);
        let err = pipeline.run(&Idea::new("T", "D")).await.unwrap_err();
        assert!(matches!(err, IdealensError::Timeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_failure_emits_single_terminal_error() {
        let generator = Arc::new(FailingGenerator {
            calls: AtomicU32::new(0),
            error: || LlmError::RateLimited("429".into()),
        });
        let pipeline = SectionPipeline::new(generator, &test_config());
        let (tx, mut rx) = mpsc::channel(64);

        pipeline.run_streaming(Idea::new("T", "D"), tx).await;

        let mut terminal_errors = 0;
        let mut completes = 0;
        while let Some(ev) = rx.recv().await {
            match ev.kind {
                crate::report::ProgressKind::Error => terminal_errors += 1,
                crate::report::ProgressKind::Complete => completes += 1,
                crate::report::ProgressKind::Progress => {}
            }
        }
        assert_eq!(terminal_errors, 1);
        assert_eq!(completes, 0);
    }
}
