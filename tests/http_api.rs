//! Router-level tests: request validation, credits, billing, and health.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use idealens::billing;
use idealens::config::Config;
use idealens::http::{router, AppState};
use idealens::llm::{CannedGenerator, LlmError, TextGenerator};
use idealens::store::CreditStore;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

/// Fails the test if any LLM call is attempted.
struct PanickingGenerator;

#[async_trait]
impl TextGenerator for PanickingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        panic!("LLM call made where none was expected");
    }
}

fn state_with(generator: Arc<dyn TextGenerator>, store: Option<CreditStore>) -> AppState {
    let mut config = Config::default();
    config.billing.secret = Some("test_secret".to_string());
    config.billing.key_id = "key_test".to_string();
    AppState {
        config: Arc::new(config),
        generator,
        store,
    }
}

async fn memory_store() -> CreditStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = CreditStore::new(pool);
    store.migrate().await.unwrap();
    store
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn empty_body_is_rejected_before_any_llm_or_db_call() {
    let app = router(state_with(Arc::new(PanickingGenerator), None));
    let response = app.oneshot(post_json("/validate", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_body_is_rejected_on_the_streaming_path_too() {
    let app = router(state_with(Arc::new(PanickingGenerator), None));
    let response = app
        .oneshot(post_json("/validate/stream", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = router(state_with(Arc::new(PanickingGenerator), None));
    let response = app
        .oneshot(post_json(
            "/validate",
            r#"{"title": "   ", "description": "something"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn validate_returns_a_complete_report() {
    let app = router(state_with(Arc::new(CannedGenerator::new()), None));
    let response = app
        .oneshot(post_json(
            "/validate",
            r#"{"title": "Test", "description": "Desc"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    for key in [
        "validationScore",
        "improvementSuggestions",
        "coreFeatures",
        "techStack",
        "pricing",
        "userFlow",
        "mvpKanban",
        "competitiveAnalysis",
        "financialModeling",
        "launchRoadmap",
        "similarIdeas",
    ] {
        assert!(
            !json["analysis"][key].is_null(),
            "analysis missing section {key}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn upstream_failure_is_invisible_in_the_response_envelope() {
    struct Overloaded;
    #[async_trait]
    impl TextGenerator for Overloaded {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Overloaded("busy".into()))
        }
    }

    let app = router(state_with(Arc::new(Overloaded), None));
    let response = app
        .oneshot(post_json(
            "/validate",
            r#"{"title": "Foo", "description": "Bar"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    // Same envelope shape as a successful run: no field discloses that the
    // report came from the local generator.
    assert!(json.get("fallback").is_none());
    assert!(!json["analysis"]["validationScore"].is_null());
    assert!(json["analysis"]["coreFeatures"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["title"] == "Core Solution for Foo"));
}

// Real time here: paused time races the sqlite worker thread against the
// pool's acquire timeout timer.
#[tokio::test]
async fn validate_charges_one_credit_when_user_is_present() {
    let store = memory_store().await;
    store.grant_credits("u@example.com", "starter", 2).await.unwrap();
    let user = store.find_by_email("u@example.com").await.unwrap().unwrap();

    let state = state_with(Arc::new(CannedGenerator::new()), Some(store.clone()));
    let body = format!(
        r#"{{"title": "T", "description": "D", "userId": "{}"}}"#,
        user.id
    );
    let response = router(state)
        .oneshot(post_json("/validate", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.balance(&user.id).await.unwrap(), 1);
}

#[tokio::test]
async fn validate_with_no_credits_is_payment_required() {
    let store = memory_store().await;
    let user = store.get_or_create_user("broke@example.com").await.unwrap();

    let state = state_with(Arc::new(PanickingGenerator), Some(store));
    let body = format!(
        r#"{{"title": "T", "description": "D", "userId": "{}"}}"#,
        user.id
    );
    let response = router(state)
        .oneshot(post_json("/validate", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn bypass_config_skips_the_charge() {
    let store = memory_store().await;
    let user = store.get_or_create_user("free@example.com").await.unwrap();

    let mut config = Config::default();
    config.credits.bypass = true;
    let state = AppState {
        config: Arc::new(config),
        generator: Arc::new(CannedGenerator::new()),
        store: Some(store.clone()),
    };
    let body = format!(
        r#"{{"title": "T", "description": "D", "userId": "{}"}}"#,
        user.id
    );
    let response = router(state)
        .oneshot(post_json("/validate", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.balance(&user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn health_reports_healthy_with_working_generator() {
    let app = router(state_with(Arc::new(CannedGenerator::new()), None));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["responseTime"].is_u64());
}

#[tokio::test]
async fn health_reports_auth_error_classification() {
    struct AuthFail;
    #[async_trait]
    impl TextGenerator for AuthFail {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Auth("bad key".into()))
        }
    }

    let app = router(state_with(Arc::new(AuthFail), None));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["status"], "auth_error");
}

#[tokio::test]
async fn billing_order_returns_plan_amount() {
    let app = router(state_with(Arc::new(PanickingGenerator), None));
    let response = app
        .oneshot(post_json(
            "/billing/order",
            r#"{"planId": "starter", "userEmail": "x@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["amount"], 900);
    assert_eq!(json["currency"], "USD");
    assert_eq!(json["keyId"], "key_test");
    assert!(json["orderId"].as_str().unwrap().starts_with("order_"));
}

#[tokio::test]
async fn billing_verify_accepts_a_valid_signature_and_credits_the_user() {
    let store = memory_store().await;
    let state = state_with(Arc::new(PanickingGenerator), Some(store.clone()));

    let signature = billing::sign(b"test_secret", "order_1", "pay_1").unwrap();
    let body = format!(
        r#"{{"orderId": "order_1", "paymentId": "pay_1", "signature": "{}", "planId": "starter", "userEmail": "buyer@example.com"}}"#,
        signature
    );
    let response = router(state)
        .oneshot(post_json("/billing/verify", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["credits"], 10);

    let user = store
        .find_by_email("buyer@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.credits, 10);
    assert_eq!(user.plan_id, "starter");
}

#[tokio::test]
async fn billing_verify_rejects_a_mutated_signature_with_401() {
    let store = memory_store().await;
    let state = state_with(Arc::new(PanickingGenerator), Some(store.clone()));

    let signature = billing::sign(b"test_secret", "order_1", "pay_1").unwrap();
    let mut mutated: Vec<u8> = signature.into_bytes();
    mutated[0] = if mutated[0] == b'0' { b'1' } else { b'0' };
    let mutated = String::from_utf8(mutated).unwrap();

    let body = format!(
        r#"{{"orderId": "order_1", "paymentId": "pay_1", "signature": "{}", "planId": "starter", "userEmail": "buyer@example.com"}}"#,
        mutated
    );
    let response = router(state)
        .oneshot(post_json("/billing/verify", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No credits were granted on the failed verification.
    assert!(store
        .find_by_email("buyer@example.com")
        .await
        .unwrap()
        .is_none());
}
