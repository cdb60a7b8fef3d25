//! Configuration loaded from idealens.toml and environment variables.
//!
//! File values come first, `LENS_*` environment overrides win, secrets come
//! only from the environment. `dotenvy` picks up a local `.env` when present.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub credits: CreditsConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: std::net::SocketAddr,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8790"
                .parse()
                .expect("default bind address should parse"),
            log_level: "idealens=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "gemini", "canned", or empty for auto-detection by API key.
    pub provider: String,
    pub model: String,
    pub timeout_ms: u64,
    /// Error out instead of falling back to the canned generator.
    pub strict: bool,
    /// From GEMINI_API_KEY only, never the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            model: "gemini-2.0-flash".to_string(),
            timeout_ms: 30_000,
            strict: false,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub retry_attempts: u32,
    pub retry_base_ms: u64,
    /// End-to-end report deadline, enforced with cooperative cancellation.
    pub deadline_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_base_ms: 1000,
            deadline_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CreditsConfig {
    /// Skip credit checks entirely. An explicit startup value, not a
    /// hardcoded call-site constant.
    pub bypass: bool,
    pub database_url: Option<String>,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            bypass: false,
            database_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Public key identifier returned to the checkout client.
    pub key_id: String,
    pub currency: String,
    pub plans: Vec<Plan>,
    /// From LENS_BILLING_SECRET only, never the config file.
    #[serde(skip)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Plan {
    pub id: String,
    /// Amount in the currency's minor unit.
    pub amount: u64,
    pub credits: i64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            currency: "USD".to_string(),
            plans: vec![
                Plan {
                    id: "starter".to_string(),
                    amount: 900,
                    credits: 10,
                },
                Plan {
                    id: "pro".to_string(),
                    amount: 2900,
                    credits: 50,
                },
            ],
            secret: None,
        }
    }
}

impl BillingConfig {
    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }
}

impl Config {
    /// Load configuration from the TOML file and environment variables.
    /// Uses IDEALENS_CONFIG or defaults to "idealens.toml".
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path =
            std::env::var("IDEALENS_CONFIG").unwrap_or_else(|_| "idealens.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("LENS_BIND") {
            match v.parse() {
                Ok(bind) => self.server.bind = bind,
                Err(_) => tracing::warn!("LENS_BIND '{}' is not a socket address, ignoring", v),
            }
        }
        if let Ok(v) = std::env::var("LENS_LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LENS_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env_u64("LENS_LLM_TIMEOUT_MS") {
            self.llm.timeout_ms = v;
        }
        if let Ok(v) = std::env::var("LENS_LLM_STRICT") {
            self.llm.strict = is_true(&v);
        }
        self.llm.api_key = std::env::var("GEMINI_API_KEY").ok();

        if let Some(v) = env_u64("LENS_RETRY_ATTEMPTS") {
            self.pipeline.retry_attempts = v as u32;
        }
        if let Some(v) = env_u64("LENS_RETRY_BASE_MS") {
            self.pipeline.retry_base_ms = v;
        }
        if let Some(v) = env_u64("LENS_DEADLINE_MS") {
            self.pipeline.deadline_ms = v;
        }

        if let Ok(v) = std::env::var("LENS_BYPASS_CREDITS") {
            self.credits.bypass = is_true(&v);
        }
        if let Ok(v) = std::env::var("LENS_DB_URL") {
            self.credits.database_url = Some(v);
        }

        if let Ok(v) = std::env::var("LENS_BILLING_KEY_ID") {
            self.billing.key_id = v;
        }
        self.billing.secret = std::env::var("LENS_BILLING_SECRET").ok();
    }

    fn validate(&mut self) -> anyhow::Result<()> {
        if self.pipeline.retry_attempts == 0 {
            self.pipeline.retry_attempts = 1;
        } else if self.pipeline.retry_attempts > 10 {
            tracing::warn!(
                "pipeline.retry_attempts {} exceeds max 10, clamping to 10",
                self.pipeline.retry_attempts
            );
            self.pipeline.retry_attempts = 10;
        }

        if self.pipeline.deadline_ms < 5_000 {
            tracing::warn!(
                "pipeline.deadline_ms {} is shorter than a single section could take",
                self.pipeline.deadline_ms
            );
        }

        if self.billing.plans.is_empty() {
            anyhow::bail!("billing.plans must not be empty");
        }
        for plan in &self.billing.plans {
            if plan.credits <= 0 {
                anyhow::bail!("billing plan '{}' must grant at least one credit", plan.id);
            }
        }

        if self.credits.bypass {
            tracing::warn!("credit checks are bypassed (credits.bypass = true)");
        }

        Ok(())
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn is_true(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}
