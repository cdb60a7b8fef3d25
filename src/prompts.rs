//! Prompt builder for the eleven report sections.
//!
//! Pure string templating: no I/O, no failure modes. Each prompt embeds the
//! literal title/description and names the exact JSON shape the section must
//! return, with an explicit "JSON only" instruction to keep the downstream
//! parser out of trouble.

use serde::{Deserialize, Serialize};

/// The eleven report sections, in pipeline order.
///
/// The order is fixed because later sections conceptually build on earlier
/// ones (financial modeling assumes pricing exists), even though every prompt
/// is independently templated from just (title, description).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    ValidationScore,
    ImprovementSuggestions,
    CoreFeatures,
    TechStack,
    Pricing,
    UserFlow,
    MvpKanban,
    CompetitiveAnalysis,
    FinancialModeling,
    LaunchRoadmap,
    SimilarIdeas,
}

impl SectionKind {
    /// Pipeline order. Weights below must stay aligned with this.
    pub const ALL: [SectionKind; 11] = [
        SectionKind::ValidationScore,
        SectionKind::ImprovementSuggestions,
        SectionKind::CoreFeatures,
        SectionKind::TechStack,
        SectionKind::Pricing,
        SectionKind::UserFlow,
        SectionKind::MvpKanban,
        SectionKind::CompetitiveAnalysis,
        SectionKind::FinancialModeling,
        SectionKind::LaunchRoadmap,
        SectionKind::SimilarIdeas,
    ];

    /// Report key for this section, matching the wire names in `report`.
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::ValidationScore => "validationScore",
            SectionKind::ImprovementSuggestions => "improvementSuggestions",
            SectionKind::CoreFeatures => "coreFeatures",
            SectionKind::TechStack => "techStack",
            SectionKind::Pricing => "pricing",
            SectionKind::UserFlow => "userFlow",
            SectionKind::MvpKanban => "mvpKanban",
            SectionKind::CompetitiveAnalysis => "competitiveAnalysis",
            SectionKind::FinancialModeling => "financialModeling",
            SectionKind::LaunchRoadmap => "launchRoadmap",
            SectionKind::SimilarIdeas => "similarIdeas",
        }
    }

    /// Human-readable step label used in progress events.
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::ValidationScore => "Scoring the idea",
            SectionKind::ImprovementSuggestions => "Collecting improvement suggestions",
            SectionKind::CoreFeatures => "Defining core features",
            SectionKind::TechStack => "Recommending a tech stack",
            SectionKind::Pricing => "Designing pricing tiers",
            SectionKind::UserFlow => "Mapping the user flow",
            SectionKind::MvpKanban => "Planning the MVP board",
            SectionKind::CompetitiveAnalysis => "Analyzing competitors",
            SectionKind::FinancialModeling => "Projecting financials",
            SectionKind::LaunchRoadmap => "Drafting the launch roadmap",
            SectionKind::SimilarIdeas => "Finding similar ideas",
        }
    }

    /// Fixed progress weight for this section. The eleven weights sum to 100.
    pub fn weight(&self) -> u8 {
        match self {
            SectionKind::ValidationScore => 10,
            _ => 9,
        }
    }

    /// Cumulative percent after this section completes (monotone, ends at 100).
    pub fn percent_after(&self) -> u8 {
        let mut total = 0u8;
        for kind in SectionKind::ALL {
            total += kind.weight();
            if kind == *self {
                break;
            }
        }
        total
    }

    /// Fixed pause after this section, a deliberate rate-limiting measure
    /// against the upstream API. Not a timeout and not backoff.
    pub fn pacing_delay_ms(&self) -> u64 {
        match self {
            SectionKind::ValidationScore => 600,
            SectionKind::ImprovementSuggestions => 500,
            SectionKind::CoreFeatures => 800,
            SectionKind::TechStack => 500,
            SectionKind::Pricing => 700,
            SectionKind::UserFlow => 500,
            SectionKind::MvpKanban => 800,
            SectionKind::CompetitiveAnalysis => 1000,
            SectionKind::FinancialModeling => 1000,
            SectionKind::LaunchRoadmap => 600,
            SectionKind::SimilarIdeas => 500,
        }
    }

    /// JSON shape instruction for this section.
    fn shape(&self) -> &'static str {
        match self {
            SectionKind::ValidationScore => {
                r#"a JSON object {"score": <0-100>, "verdict": "...", "strengths": ["..."], "risks": ["..."]}"#
            }
            SectionKind::ImprovementSuggestions => {
                r#"a JSON array of {"title": "...", "description": "...", "priority": "high"|"medium"|"low"}"#
            }
            SectionKind::CoreFeatures => {
                r#"a JSON array of {"title": "...", "description": "...", "priority": "high"|"medium"|"low"}"#
            }
            SectionKind::TechStack => {
                r#"a JSON object {"frontend": ["..."], "backend": ["..."], "database": ["..."], "infrastructure": ["..."]}"#
            }
            SectionKind::Pricing => {
                r#"a JSON array of {"name": "...", "price": "...", "target": "...", "features": ["..."]}"#
            }
            SectionKind::UserFlow => {
                r#"a JSON array of {"step": <number>, "title": "...", "description": "..."}"#
            }
            SectionKind::MvpKanban => {
                r#"a JSON object {"todo": [<card>], "inProgress": [<card>], "done": [<card>]} where <card> is {"title": "...", "description": "...", "priority": "high"|"medium"|"low"}"#
            }
            SectionKind::CompetitiveAnalysis => {
                r#"a JSON object {"competitors": [{"name": "...", "strengths": ["..."], "weaknesses": ["..."]}], "differentiation": "...", "marketGap": "..."}"#
            }
            SectionKind::FinancialModeling => {
                r#"a JSON object {"assumptions": ["..."], "projections": [{"year": <number>, "revenue": "...", "costs": "...", "profit": "..."}], "breakEven": "..."}"#
            }
            SectionKind::LaunchRoadmap => {
                r#"a JSON array of {"phase": "...", "timeline": "...", "milestones": ["..."]}"#
            }
            SectionKind::SimilarIdeas => {
                r#"a JSON array of {"name": "...", "description": "...", "takeaway": "..."}"#
            }
        }
    }

    /// Task framing for this section.
    fn task(&self) -> &'static str {
        match self {
            SectionKind::ValidationScore => {
                "Score the idea's viability from 0 to 100 and give a one-paragraph verdict with the main strengths and risks."
            }
            SectionKind::ImprovementSuggestions => {
                "Suggest 3-5 concrete improvements that would make this idea stronger before launch."
            }
            SectionKind::CoreFeatures => {
                "List the 4-6 core features an MVP of this product must ship with."
            }
            SectionKind::TechStack => {
                "Recommend a pragmatic technology stack for a small team building this product."
            }
            SectionKind::Pricing => {
                "Design 2-4 pricing tiers appropriate for this product's likely customers."
            }
            SectionKind::UserFlow => {
                "Describe the primary user journey from landing to realized value as numbered steps."
            }
            SectionKind::MvpKanban => {
                "Lay out an MVP build plan as a kanban board with todo, in-progress, and done columns (done may be empty)."
            }
            SectionKind::CompetitiveAnalysis => {
                "Identify 2-4 existing competitors, how this idea differs, and the market gap it targets."
            }
            SectionKind::FinancialModeling => {
                "Sketch a three-year financial projection with explicit assumptions and a break-even estimate. Assume the pricing tiers from the report exist."
            }
            SectionKind::LaunchRoadmap => {
                "Plan the launch as 3-4 phases with timelines and milestones."
            }
            SectionKind::SimilarIdeas => {
                "Name 2-4 similar products or past attempts and what to learn from each."
            }
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Build the instruction prompt for one section. Deterministic.
pub fn build_prompt(kind: SectionKind, title: &str, description: &str) -> String {
    format!(
        "You are evaluating a SaaS idea.\n\
         Idea title: {title:?}\n\
         Idea description: {description:?}\n\n\
         Task: {task}\n\n\
         Return ONLY {shape} for the \"{key}\" section.\n\
         Output raw JSON only. NO markdown blocks (```json). NO intro/outro text.",
        title = title,
        description = description,
        task = kind.task(),
        shape = kind.shape(),
        key = kind.key(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_hundred() {
        let total: u32 = SectionKind::ALL.iter().map(|k| k.weight() as u32).sum();
        assert_eq!(total, 100);
        assert_eq!(SectionKind::SimilarIdeas.percent_after(), 100);
    }

    #[test]
    fn percent_after_is_strictly_increasing() {
        let mut prev = 0u8;
        for kind in SectionKind::ALL {
            let p = kind.percent_after();
            assert!(p > prev, "{kind} percent {p} not above {prev}");
            prev = p;
        }
    }

    #[test]
    fn prompt_embeds_idea_and_names_section() {
        let p = build_prompt(SectionKind::Pricing, "LensCap", "A lens cap finder");
        assert!(p.contains("LensCap"));
        assert!(p.contains("A lens cap finder"));
        assert!(p.contains("\"pricing\""));
        assert!(p.contains("JSON only"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = build_prompt(SectionKind::TechStack, "T", "D");
        let b = build_prompt(SectionKind::TechStack, "T", "D");
        assert_eq!(a, b);
    }

    #[test]
    fn pacing_delays_stay_in_rate_limit_band() {
        for kind in SectionKind::ALL {
            let d = kind.pacing_delay_ms();
            assert!((500..=1000).contains(&d), "{kind} delay {d} out of band");
        }
    }
}
