//! Fallback report generator.
//!
//! Pure function from (title, description) to a complete, schema-valid
//! report. No network, no randomness, no failure modes: identical input
//! produces byte-identical output. When the upstream model is unreachable
//! the non-streaming path serves this wholesale, and a caller cannot tell
//! it apart structurally from an AI-derived report.

use crate::report::{
    Competitor, CompetitiveAnalysis, Feature, FinancialModel, FlowStep, Idea, KanbanCard,
    MvpKanban, PricingTier, Priority, Report, RoadmapPhase, SimilarIdea, Suggestion, TechStack,
    ValidationScore, YearProjection,
};

pub fn fallback_report(title: &str, description: &str) -> Report {
    Report {
        idea: Idea::new(title, description),
        validation_score: ValidationScore {
            score: 70,
            verdict: format!(
                "{} addresses a real need described as: {}. The concept is viable \
                 but requires market validation with real users before committing \
                 significant resources.",
                title, description
            ),
            strengths: vec![
                format!("{} has a clearly articulated problem statement", title),
                "The scope is narrow enough for a small team to ship an MVP".to_string(),
                "A subscription model fits this kind of product".to_string(),
            ],
            risks: vec![
                "Market demand is unproven until tested with real users".to_string(),
                "Customer acquisition cost may exceed early-stage budget".to_string(),
                "Incumbents could replicate the core feature quickly".to_string(),
            ],
        },
        improvement_suggestions: vec![
            Suggestion {
                title: "Validate with potential customers".to_string(),
                description: format!(
                    "Interview 10-15 people in the target market for {} before building anything.",
                    title
                ),
                priority: Priority::High,
            },
            Suggestion {
                title: "Narrow the initial audience".to_string(),
                description: "Pick one niche segment and serve it exceptionally well first."
                    .to_string(),
                priority: Priority::High,
            },
            Suggestion {
                title: "Define one success metric".to_string(),
                description: "Choose a single activation metric and instrument it from day one."
                    .to_string(),
                priority: Priority::Medium,
            },
            Suggestion {
                title: "Prepare a landing page".to_string(),
                description: format!(
                    "A waitlist page for {} measures interest before the product exists.",
                    title
                ),
                priority: Priority::Low,
            },
        ],
        core_features: vec![
            Feature {
                title: format!("Core Solution for {}", title),
                description: format!(
                    "The central workflow that delivers on the promise: {}",
                    description
                ),
                priority: Priority::High,
            },
            Feature {
                title: "User Accounts & Onboarding".to_string(),
                description: "Sign-up, authentication, and a guided first-run experience."
                    .to_string(),
                priority: Priority::High,
            },
            Feature {
                title: "Dashboard".to_string(),
                description: format!("A single view of everything {} tracks for the user.", title),
                priority: Priority::Medium,
            },
            Feature {
                title: "Notifications".to_string(),
                description: "Email alerts for the events users care about most.".to_string(),
                priority: Priority::Medium,
            },
            Feature {
                title: "Billing & Plans".to_string(),
                description: "Subscription management with self-serve upgrades.".to_string(),
                priority: Priority::Low,
            },
        ],
        tech_stack: TechStack {
            frontend: vec!["React".to_string(), "Tailwind CSS".to_string()],
            backend: vec!["Node.js".to_string(), "Express".to_string()],
            database: vec!["PostgreSQL".to_string()],
            infrastructure: vec![
                "Vercel".to_string(),
                "Supabase".to_string(),
                "Cloudflare".to_string(),
            ],
        },
        pricing: vec![
            PricingTier {
                name: "Free".to_string(),
                price: "$0/month".to_string(),
                target: "Individuals evaluating the product".to_string(),
                features: vec![
                    "Core features with usage limits".to_string(),
                    "Community support".to_string(),
                ],
            },
            PricingTier {
                name: "Pro".to_string(),
                price: "$19/month".to_string(),
                target: format!("Professionals who rely on {} daily", title),
                features: vec![
                    "Unlimited usage".to_string(),
                    "Priority support".to_string(),
                    "Export and integrations".to_string(),
                ],
            },
            PricingTier {
                name: "Team".to_string(),
                price: "$49/month".to_string(),
                target: "Small teams collaborating on shared workspaces".to_string(),
                features: vec![
                    "Everything in Pro".to_string(),
                    "Team workspaces and roles".to_string(),
                    "Usage analytics".to_string(),
                ],
            },
        ],
        user_flow: vec![
            FlowStep {
                step: 1,
                title: "Discover".to_string(),
                description: format!("A prospect lands on the {} marketing page.", title),
            },
            FlowStep {
                step: 2,
                title: "Sign up".to_string(),
                description: "They create an account with email or OAuth.".to_string(),
            },
            FlowStep {
                step: 3,
                title: "First value".to_string(),
                description: format!(
                    "Guided onboarding walks them through the core workflow: {}",
                    description
                ),
            },
            FlowStep {
                step: 4,
                title: "Habit".to_string(),
                description: "Notifications bring them back as new data arrives.".to_string(),
            },
            FlowStep {
                step: 5,
                title: "Upgrade".to_string(),
                description: "Hitting free-tier limits prompts a self-serve upgrade.".to_string(),
            },
        ],
        mvp_kanban: MvpKanban {
            todo: vec![
                KanbanCard {
                    title: format!("Build core workflow for {}", title),
                    description: "The single feature the MVP exists to prove.".to_string(),
                    priority: Priority::High,
                },
                KanbanCard {
                    title: "Authentication".to_string(),
                    description: "Email plus OAuth sign-in.".to_string(),
                    priority: Priority::High,
                },
                KanbanCard {
                    title: "Billing integration".to_string(),
                    description: "One-time and subscription checkout.".to_string(),
                    priority: Priority::Medium,
                },
                KanbanCard {
                    title: "Landing page".to_string(),
                    description: "Positioning, pricing, and a sign-up call to action.".to_string(),
                    priority: Priority::Medium,
                },
            ],
            in_progress: vec![KanbanCard {
                title: "Customer interviews".to_string(),
                description: format!("Validate the premise of {} with 10-15 prospects.", title),
                priority: Priority::High,
            }],
            done: vec![KanbanCard {
                title: "Idea definition".to_string(),
                description: format!("Documented the concept: {}", description),
                priority: Priority::Low,
            }],
        },
        competitive_analysis: CompetitiveAnalysis {
            competitors: vec![
                Competitor {
                    name: "Established generalist tools".to_string(),
                    strengths: vec![
                        "Brand recognition".to_string(),
                        "Existing user base".to_string(),
                    ],
                    weaknesses: vec![
                        format!("Not purpose-built for the problem {} solves", title),
                        "Slower to ship niche features".to_string(),
                    ],
                },
                Competitor {
                    name: "Spreadsheets and manual processes".to_string(),
                    strengths: vec!["Free".to_string(), "Familiar to everyone".to_string()],
                    weaknesses: vec![
                        "Error-prone at scale".to_string(),
                        "No automation or alerts".to_string(),
                    ],
                },
            ],
            differentiation: format!(
                "{} wins by focusing narrowly on one underserved workflow: {}",
                title, description
            ),
            market_gap: "Purpose-built tooling for this niche remains thin; most users \
                         cobble together generic tools."
                .to_string(),
        },
        financial_modeling: FinancialModel {
            assumptions: vec![
                "Average revenue per paying user of $19/month".to_string(),
                "3% visitor-to-paid conversion after the first year".to_string(),
                "Monthly churn of 5% trending toward 3%".to_string(),
                format!("Marketing spend for {} stays under 40% of revenue", title),
            ],
            projections: vec![
                YearProjection {
                    year: 1,
                    revenue: "$12,000".to_string(),
                    costs: "$18,000".to_string(),
                    profit: "-$6,000".to_string(),
                },
                YearProjection {
                    year: 2,
                    revenue: "$60,000".to_string(),
                    costs: "$40,000".to_string(),
                    profit: "$20,000".to_string(),
                },
                YearProjection {
                    year: 3,
                    revenue: "$180,000".to_string(),
                    costs: "$90,000".to_string(),
                    profit: "$90,000".to_string(),
                },
            ],
            break_even: "Approximately month 16, at roughly 80 paying customers".to_string(),
        },
        launch_roadmap: vec![
            RoadmapPhase {
                phase: "Validate".to_string(),
                timeline: "Weeks 1-4".to_string(),
                milestones: vec![
                    "Customer interviews complete".to_string(),
                    format!("Waitlist landing page for {} live", title),
                ],
            },
            RoadmapPhase {
                phase: "Build".to_string(),
                timeline: "Weeks 5-12".to_string(),
                milestones: vec![
                    "MVP core workflow shipped".to_string(),
                    "Billing and accounts working end to end".to_string(),
                ],
            },
            RoadmapPhase {
                phase: "Launch".to_string(),
                timeline: "Weeks 13-16".to_string(),
                milestones: vec![
                    "Public launch to the waitlist".to_string(),
                    "First 10 paying customers".to_string(),
                ],
            },
            RoadmapPhase {
                phase: "Grow".to_string(),
                timeline: "Months 5-12".to_string(),
                milestones: vec![
                    "Content and integration-led acquisition".to_string(),
                    "Team plan rollout".to_string(),
                ],
            },
        ],
        similar_ideas: vec![
            SimilarIdea {
                name: "Niche SaaS predecessors".to_string(),
                description: "Vertical tools that unbundled a workflow from horizontal suites."
                    .to_string(),
                takeaway: "Depth in one workflow beats breadth at launch.".to_string(),
            },
            SimilarIdea {
                name: "Indie products in adjacent niches".to_string(),
                description: format!(
                    "Solo-founder products targeting audiences similar to {}'s.",
                    title
                ),
                takeaway: "Distribution is usually the bottleneck, not the build.".to_string(),
            },
        ],
    }
}
