mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use notification_service::{
    api::{AppState, create_router},
    dispatcher::Dispatcher,
    models::retry::RetryConfig,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{ScriptedMailer, dispatcher, dispatcher_with};

fn app(dispatcher: Arc<Dispatcher>) -> Router {
    create_router(
        Arc::new(AppState { dispatcher }),
        &["http://localhost:3000".to_string()],
    )
}

async fn post_json(app: Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;

    read(app, request).await
}

async fn get_json(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder().uri(uri).body(Body::empty())?;

    read(app, request).await
}

async fn read(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;

    Ok((status, serde_json::from_slice(&bytes)?))
}

/// Test: Missing-person case numbers auto-select the missing person template
#[tokio::test]
async fn test_notify_detects_missing_person_template() -> Result<()> {
    let mailer = ScriptedMailer::succeeding();
    let app = app(dispatcher(Arc::clone(&mailer)));

    let (status, body) = post_json(
        app,
        "/api/notify",
        json!({
            "email": "family@example.com",
            "caseNumber": "MP-2024-001",
            "subject": "Missing Person report",
            "age": 34
        }),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["template"], "missingPersonFiled");
    assert_eq!(body["messageId"], "<msg-1@test.local>");

    let sent = mailer.sent();
    assert_eq!(sent[0].subject, "Missing Person Report Filed - MP-2024-001");
    assert!(sent[0].html.contains("34"));

    Ok(())
}

/// Test: An explicit template wins over auto-detection
#[tokio::test]
async fn test_notify_honours_explicit_template() -> Result<()> {
    let mailer = ScriptedMailer::succeeding();
    let app = app(dispatcher(Arc::clone(&mailer)));

    let (status, body) = post_json(
        app,
        "/api/notify",
        json!({
            "email": "citizen@example.com",
            "template": "missingPersonReassigned",
            "caseNumber": "FIR-2024-001"
        }),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "missingPersonReassigned");

    Ok(())
}

/// Test: Without an email the recipient is derived from the user id
#[tokio::test]
async fn test_notify_derives_recipient_from_user_id() -> Result<()> {
    let mailer = ScriptedMailer::succeeding();
    let app = app(dispatcher(Arc::clone(&mailer)));

    let (status, body) = post_json(
        app,
        "/api/notify",
        json!({ "userId": 42, "subject": "Welcome", "message": "Hello" }),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "generic");
    assert_eq!(mailer.sent()[0].to, "user-42@placeholder.local");

    Ok(())
}

/// Test: Notify without email or user id is rejected
#[tokio::test]
async fn test_notify_requires_some_recipient() -> Result<()> {
    let mailer = ScriptedMailer::succeeding();
    let app = app(dispatcher(Arc::clone(&mailer)));

    let (status, body) = post_json(app, "/api/notify", json!({ "subject": "Hi" })).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(mailer.calls(), 0);

    Ok(())
}

/// Test: A transport failure is reported as accepted-for-retry
#[tokio::test]
async fn test_notify_failure_is_queued() -> Result<()> {
    let mailer = ScriptedMailer::failing_times(1);
    let dispatcher = dispatcher(Arc::clone(&mailer));

    let (status, body) = post_json(
        app(Arc::clone(&dispatcher)),
        "/api/notify",
        json!({ "email": "citizen@example.com", "caseNumber": "FIR-2024-001" }),
    )
    .await?;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], true);
    assert_eq!(body["queued"], true);
    assert_eq!(dispatcher.queue().len(), 1);

    let (status, body) = get_json(app(Arc::clone(&dispatcher)), "/api/queue/status").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["queueLength"], 1);
    assert_eq!(body["items"][0]["to"], "citizen@example.com");
    assert_eq!(body["items"][0]["template"], "firFiled");
    assert_eq!(body["items"][0]["retryCount"], 1);
    assert!(body["items"][0]["addedAt"].is_string());

    Ok(())
}

/// Test: A terminal failure surfaces as 500 with the transport error
#[tokio::test]
async fn test_send_terminal_failure() -> Result<()> {
    let mailer = ScriptedMailer::always_failing();
    let dispatcher = dispatcher_with(
        Arc::clone(&mailer),
        RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        },
    );

    let (status, body) = post_json(
        app(Arc::clone(&dispatcher)),
        "/api/send",
        json!({ "to": "citizen@example.com", "template": "statusUpdate", "data": {} }),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Connection refused");
    assert!(dispatcher.queue().is_empty());

    Ok(())
}

/// Test: Send requires a recipient
#[tokio::test]
async fn test_send_requires_recipient() -> Result<()> {
    let mailer = ScriptedMailer::succeeding();
    let app = app(dispatcher(Arc::clone(&mailer)));

    let (status, body) = post_json(
        app,
        "/api/send",
        json!({ "to": "", "template": "generic" }),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Recipient email is required" })
    );
    assert_eq!(mailer.calls(), 0);

    Ok(())
}

/// Test: Send uses the named template and its data
#[tokio::test]
async fn test_send_with_explicit_template() -> Result<()> {
    let mailer = ScriptedMailer::succeeding();
    let app = app(dispatcher(Arc::clone(&mailer)));

    let (status, body) = post_json(
        app,
        "/api/send",
        json!({
            "to": "citizen@example.com",
            "template": "firUpdate",
            "data": { "firNumber": "FIR-2024-077", "newStatus": "Closed" }
        }),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["template"], "firUpdate");
    assert_eq!(mailer.sent()[0].subject, "FIR Updated - FIR-2024-077");

    Ok(())
}

/// Test: Malformed bodies get a generic 500
#[tokio::test]
async fn test_malformed_body_is_internal_error() -> Result<()> {
    let mailer = ScriptedMailer::succeeding();
    let app = app(dispatcher(Arc::clone(&mailer)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/send")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;

    let (status, body) = read(app, request).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Internal server error");

    Ok(())
}

/// Test: Health endpoint reports liveness
#[tokio::test]
async fn test_health_check() -> Result<()> {
    let app = app(dispatcher(ScriptedMailer::succeeding()));

    let (status, body) = get_json(app, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());

    Ok(())
}

/// Test: Configured origins receive CORS headers
#[tokio::test]
async fn test_cors_allows_configured_origin() -> Result<()> {
    let app = app(dispatcher(ScriptedMailer::succeeding()));

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    Ok(())
}
