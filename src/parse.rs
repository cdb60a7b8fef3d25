//! Response parser: strip markdown code fences, then deserialize.
//!
//! No semantic validation happens here; shape checking is serde's job and
//! anything deeper is the caller's.

use serde::de::DeserializeOwned;

use crate::error::{IdealensError, Result};

/// Strip leading/trailing markdown code fences and surrounding whitespace.
/// Models add them despite being told not to.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Parse raw model output into a section record type.
pub fn parse_section<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|e| IdealensError::MalformedResponse {
        message: e.to_string(),
    })
}
