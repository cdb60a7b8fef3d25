//! LLM client adapters.

pub mod canned;
pub mod gemini;
pub mod traits;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

pub use canned::CannedGenerator;
pub use gemini::GeminiGenerator;
pub use traits::{LlmError, TextGenerator};

use crate::config::Config;

fn is_placeholder(s: &str) -> bool {
    let t = s.trim();
    t.is_empty()
        || t.contains("${")
        || t.eq_ignore_ascii_case("your-api-key-here")
        || t.eq_ignore_ascii_case("changeme")
}

/// Create the text generator selected by configuration.
///
/// Provider order: explicit `llm.provider` wins; otherwise a usable API key
/// selects Gemini; otherwise the canned generator, unless strict mode is on.
pub fn create_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let key = config.llm.api_key.clone().unwrap_or_default();

    match config.llm.provider.as_str() {
        "gemini" => {
            if is_placeholder(&key) {
                anyhow::bail!("llm.provider=gemini but GEMINI_API_KEY is not set");
            }
            info!("Using Gemini generator (model={})", config.llm.model);
            let generator =
                GeminiGenerator::new(key, config.llm.model.clone(), config.llm.timeout_ms)
                    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            return Ok(Arc::new(generator));
        }
        "canned" => {
            info!("Using canned generator (deterministic, offline)");
            return Ok(Arc::new(CannedGenerator::new()));
        }
        "" => {}
        other => anyhow::bail!("unknown llm.provider '{}'", other),
    }

    // Auto-detect
    if !is_placeholder(&key) {
        info!("Using Gemini generator (model={})", config.llm.model);
        let generator = GeminiGenerator::new(key, config.llm.model.clone(), config.llm.timeout_ms)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        return Ok(Arc::new(generator));
    }

    if config.llm.strict {
        anyhow::bail!("no generation provider configured; set GEMINI_API_KEY or llm.provider");
    }

    info!("Using canned generator (deterministic, offline)");
    Ok(Arc::new(CannedGenerator::new()))
}
