//! Typed report model: eleven named section records aggregated into one Report.
//!
//! Every section has its own record type so the wire boundary is checked by
//! serde instead of relying on duck-typed JSON blobs.

use serde::{Deserialize, Serialize};

use crate::error::{IdealensError, Result};

/// The idea under validation. Immutable input, never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub title: String,
    pub description: String,
}

impl Idea {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationScore {
    pub score: u8,
    pub verdict: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStack {
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    pub database: Vec<String>,
    pub infrastructure: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub name: String,
    pub price: String,
    pub target: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    pub step: u32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanCard {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpKanban {
    pub todo: Vec<KanbanCard>,
    pub in_progress: Vec<KanbanCard>,
    pub done: Vec<KanbanCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveAnalysis {
    pub competitors: Vec<Competitor>,
    pub differentiation: String,
    pub market_gap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProjection {
    pub year: u32,
    pub revenue: String,
    pub costs: String,
    pub profit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialModel {
    pub assumptions: Vec<String>,
    pub projections: Vec<YearProjection>,
    pub break_even: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPhase {
    pub phase: String,
    pub timeline: String,
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarIdea {
    pub name: String,
    pub description: String,
    pub takeaway: String,
}

/// The assembled validation report. Once a Report exists, every one of the
/// eleven sections is present; partial reports never escape the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub idea: Idea,
    pub validation_score: ValidationScore,
    pub improvement_suggestions: Vec<Suggestion>,
    pub core_features: Vec<Feature>,
    pub tech_stack: TechStack,
    pub pricing: Vec<PricingTier>,
    pub user_flow: Vec<FlowStep>,
    pub mvp_kanban: MvpKanban,
    pub competitive_analysis: CompetitiveAnalysis,
    pub financial_modeling: FinancialModel,
    pub launch_roadmap: Vec<RoadmapPhase>,
    pub similar_ideas: Vec<SimilarIdea>,
}

/// Accumulator for section results while the pipeline runs.
///
/// `finish` is the report assembler: all-or-nothing, a missing section is an
/// internal error rather than a hole in the output.
#[derive(Debug, Default)]
pub struct ReportDraft {
    pub validation_score: Option<ValidationScore>,
    pub improvement_suggestions: Option<Vec<Suggestion>>,
    pub core_features: Option<Vec<Feature>>,
    pub tech_stack: Option<TechStack>,
    pub pricing: Option<Vec<PricingTier>>,
    pub user_flow: Option<Vec<FlowStep>>,
    pub mvp_kanban: Option<MvpKanban>,
    pub competitive_analysis: Option<CompetitiveAnalysis>,
    pub financial_modeling: Option<FinancialModel>,
    pub launch_roadmap: Option<Vec<RoadmapPhase>>,
    pub similar_ideas: Option<Vec<SimilarIdea>>,
}

impl ReportDraft {
    pub fn finish(self, idea: Idea) -> Result<Report> {
        let missing = |section: &str| IdealensError::Internal {
            message: format!("report assembly incomplete: missing section '{}'", section),
        };
        Ok(Report {
            idea,
            validation_score: self.validation_score.ok_or_else(|| missing("validationScore"))?,
            improvement_suggestions: self
                .improvement_suggestions
                .ok_or_else(|| missing("improvementSuggestions"))?,
            core_features: self.core_features.ok_or_else(|| missing("coreFeatures"))?,
            tech_stack: self.tech_stack.ok_or_else(|| missing("techStack"))?,
            pricing: self.pricing.ok_or_else(|| missing("pricing"))?,
            user_flow: self.user_flow.ok_or_else(|| missing("userFlow"))?,
            mvp_kanban: self.mvp_kanban.ok_or_else(|| missing("mvpKanban"))?,
            competitive_analysis: self
                .competitive_analysis
                .ok_or_else(|| missing("competitiveAnalysis"))?,
            financial_modeling: self
                .financial_modeling
                .ok_or_else(|| missing("financialModeling"))?,
            launch_roadmap: self.launch_roadmap.ok_or_else(|| missing("launchRoadmap"))?,
            similar_ideas: self.similar_ideas.ok_or_else(|| missing("similarIdeas"))?,
        })
    }
}

/// Progress event emitted on the streaming path. Ephemeral and ordered; the
/// terminal event is either `complete` (carrying the report) or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub step: String,
    pub percent: u8,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Progress,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Starting,
    Processing,
    Complete,
}

impl ProgressEvent {
    pub fn progress(step: impl Into<String>, percent: u8, status: StepStatus) -> Self {
        Self {
            kind: ProgressKind::Progress,
            step: step.into(),
            percent,
            status,
            analysis: None,
            error: None,
        }
    }

    pub fn complete(report: Report) -> Self {
        Self {
            kind: ProgressKind::Complete,
            step: "report".to_string(),
            percent: 100,
            status: StepStatus::Complete,
            analysis: Some(report),
            error: None,
        }
    }

    pub fn error(step: impl Into<String>, percent: u8, message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Error,
            step: step.into(),
            percent,
            status: StepStatus::Processing,
            analysis: None,
            error: Some(message.into()),
        }
    }
}
