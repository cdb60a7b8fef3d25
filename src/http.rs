//! HTTP transport for the idealens report service.
//!
//! Axum router with JSON endpoints for report generation (plain and
//! streaming), a health probe against the upstream model, and the billing
//! collaborators. Streaming uses server-sent events fed by the pipeline
//! task through a bounded channel.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::billing;
use crate::config::Config;
use crate::error::{IdealensError, Result};
use crate::llm::{LlmError, TextGenerator};
use crate::pipeline::SectionPipeline;
use crate::report::Idea;
use crate::store::CreditStore;

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn TextGenerator>,
    pub store: Option<CreditStore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
}

impl ValidateRequest {
    /// Reject missing/blank fields before any LLM or database work happens.
    fn idea(&self) -> Result<Idea> {
        let title = self.title.as_deref().unwrap_or("").trim();
        let description = self.description.as_deref().unwrap_or("").trim();
        if title.is_empty() || description.is_empty() {
            return Err(IdealensError::Validation {
                message: "both 'title' and 'description' are required".to_string(),
            });
        }
        Ok(Idea::new(title, description))
    }
}

async fn charge_if_required(state: &AppState, user_id: Option<&str>) -> Result<()> {
    let user_id = match user_id {
        Some(id) if !state.config.credits.bypass => id,
        _ => return Ok(()),
    };
    match &state.store {
        Some(store) => {
            store.consume_credit(user_id, 0).await?;
            Ok(())
        }
        None => {
            warn!("credits ledger not configured, skipping charge");
            Ok(())
        }
    }
}

/// Non-streaming report generation. Upstream AI failures never surface here;
/// a well-formed request always gets a 200 with a complete report.
async fn validate_handler(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<Value>> {
    let idea = req.idea()?;
    charge_if_required(&state, req.user_id.as_deref()).await?;

    // The fallback flag stays server-side; the wire response is identical
    // whether the model answered or not.
    let pipeline = SectionPipeline::new(state.generator.clone(), &state.config.pipeline);
    let (report, _) = pipeline.run_with_fallback(&idea).await;

    Ok(Json(json!({
        "success": true,
        "analysis": report,
    })))
}

/// Streaming report generation: SSE of progress events, terminating in one
/// `complete` event with the report or one `error` event.
async fn validate_stream_handler(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let idea = req.idea()?;
    charge_if_required(&state, req.user_id.as_deref()).await?;

    let (tx, rx) = mpsc::channel(32);
    let pipeline = SectionPipeline::new(state.generator.clone(), &state.config.pipeline);
    tokio::spawn(async move {
        pipeline.run_streaming(idea, tx).await;
    });

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(&event));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Health probe: one trivial upstream call, classified.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let start = Instant::now();
    let probe = state
        .generator
        .generate("Reply with the single word: ok")
        .await;
    let response_time = start.elapsed().as_millis() as u64;

    let (status, recommendation) = match &probe {
        Ok(_) => ("healthy", "Service is operating normally"),
        Err(LlmError::Overloaded(_)) => (
            "overloaded",
            "Upstream model is overloaded; retry in a few minutes",
        ),
        Err(LlmError::RateLimited(_)) => ("rate_limited", "Reduce request rate or upgrade quota"),
        Err(LlmError::Auth(_)) => ("auth_error", "Check the configured API key"),
        Err(LlmError::Unknown(_)) => ("unhealthy", "Upstream model is unreachable"),
    };

    Json(json!({
        "status": status,
        "responseTime": response_time,
        "recommendation": recommendation,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest {
    plan_id: String,
    user_email: String,
}

async fn billing_order_handler(
    State(state): State<AppState>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<Value>> {
    if req.user_email.trim().is_empty() {
        return Err(IdealensError::Validation {
            message: "'userEmail' is required".to_string(),
        });
    }
    let order = billing::create_order(&state.config.billing, &req.plan_id)?;
    Ok(Json(serde_json::to_value(order)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    order_id: String,
    payment_id: String,
    signature: String,
    plan_id: String,
    user_email: String,
}

async fn billing_verify_handler(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Value>> {
    let secret = state
        .config
        .billing
        .secret
        .as_deref()
        .ok_or_else(|| IdealensError::Config {
            message: "billing secret is not configured".to_string(),
        })?;

    billing::verify_signature(
        secret.as_bytes(),
        &req.order_id,
        &req.payment_id,
        &req.signature,
    )?;

    let plan = state
        .config
        .billing
        .plan(&req.plan_id)
        .ok_or_else(|| IdealensError::Validation {
            message: format!("unknown plan '{}'", req.plan_id),
        })?;

    let store = state.store.as_ref().ok_or_else(|| IdealensError::Database {
        message: "credits ledger not configured".to_string(),
    })?;
    let credits = store
        .grant_credits(&req.user_email, &plan.id, plan.credits)
        .await?;

    Ok(Json(json!({ "success": true, "credits": credits })))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/validate", post(validate_handler))
        .route("/validate/stream", post(validate_stream_handler))
        .route("/billing/order", post(billing_order_handler))
        .route("/billing/verify", post(billing_verify_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let bind = state.config.server.bind;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| IdealensError::Internal {
            message: format!("failed to bind HTTP listener: {}", e),
        })?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| IdealensError::Internal {
            message: format!("HTTP server error: {}", e),
        })?;

    Ok(())
}
