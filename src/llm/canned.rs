//! Deterministic, offline generator for local development and tests.
//!
//! Mirrors the wire contract of the real adapter: every section prompt gets a
//! schema-valid JSON payload, so the whole pipeline exercises the same parse
//! path it uses in production. No network, no randomness.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::fallback;
use crate::llm::traits::{LlmError, TextGenerator};
use crate::prompts::SectionKind;
use crate::report::Report;

// The fallback report is the one place that already knows every section
// shape, so canned payloads are sliced out of one shared instance.
static CANNED_REPORT: Lazy<Report> = Lazy::new(|| {
    fallback::fallback_report("Sample SaaS idea", "A canned response for offline use")
});

pub struct CannedGenerator;

impl CannedGenerator {
    pub fn new() -> Self {
        CannedGenerator
    }
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn canned_payload(kind: SectionKind) -> Result<String, LlmError> {
    let report: &Report = &CANNED_REPORT;
    let to_json = |v: serde_json::Result<String>| {
        v.map_err(|e| LlmError::Unknown(format!("canned payload serialization: {}", e)))
    };
    match kind {
        SectionKind::ValidationScore => to_json(serde_json::to_string(&report.validation_score)),
        SectionKind::ImprovementSuggestions => {
            to_json(serde_json::to_string(&report.improvement_suggestions))
        }
        SectionKind::CoreFeatures => to_json(serde_json::to_string(&report.core_features)),
        SectionKind::TechStack => to_json(serde_json::to_string(&report.tech_stack)),
        SectionKind::Pricing => to_json(serde_json::to_string(&report.pricing)),
        SectionKind::UserFlow => to_json(serde_json::to_string(&report.user_flow)),
        SectionKind::MvpKanban => to_json(serde_json::to_string(&report.mvp_kanban)),
        SectionKind::CompetitiveAnalysis => {
            to_json(serde_json::to_string(&report.competitive_analysis))
        }
        SectionKind::FinancialModeling => {
            to_json(serde_json::to_string(&report.financial_modeling))
        }
        SectionKind::LaunchRoadmap => to_json(serde_json::to_string(&report.launch_roadmap)),
        SectionKind::SimilarIdeas => to_json(serde_json::to_string(&report.similar_ideas)),
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match SectionKind::ALL
            .iter()
            .find(|kind| prompt.contains(&format!("\"{}\"", kind.key())))
        {
            Some(kind) => canned_payload(*kind),
            // Health probes and other free-form prompts get a plain ack.
            None => Ok("ok".to_string()),
        }
    }
}
