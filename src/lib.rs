pub mod billing;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http;
pub mod llm;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod retry;
pub mod store;

// Load env from a simple, standardized location resolution.
// This uses dotenvy::dotenv().ok() which loads .env if present and silently ignores if missing.
pub fn load_env() {
    let _ = dotenvy::dotenv();
}
