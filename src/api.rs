use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Config,
    dispatcher::Dispatcher,
    error::ApiError,
    models::{
        health::HealthCheckResponse,
        notification::{NotifyRequest, SendRequest},
        response::{DispatchOutcome, NotificationResponse, QueueStatusResponse},
        template::{TemplateData, TemplateKind},
    },
};

pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/notify", post(notify))
        .route("/api/send", post(send))
        .route("/api/queue/status", get(queue_status))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: &Config, state: Arc<AppState>) -> Result<(), Error> {
    let app = create_router(state, &config.allowed_origins());

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

async fn health_check() -> impl IntoResponse {
    Json(HealthCheckResponse::ok())
}

async fn notify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Internal(e.body_text()))?;

    let recipient = request.recipient().ok_or_else(|| {
        ApiError::Validation("Recipient email or userId is required".to_string())
    })?;
    let kind = request.template_kind();

    info!(recipient = %recipient, template = %kind, "Notification request received");

    let outcome = state
        .dispatcher
        .send_email(&recipient, TemplateData::new(kind, request.data), 0)
        .await;

    Ok(outcome_response(outcome, kind))
}

async fn send(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Internal(e.body_text()))?;

    let recipient = request
        .to
        .as_deref()
        .map(str::trim)
        .filter(|to| !to.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation("Recipient email is required".to_string()))?;
    let kind = request.template_kind();

    let outcome = state
        .dispatcher
        .send_email(&recipient, TemplateData::new(kind, request.data), 0)
        .await;

    Ok(outcome_response(outcome, kind))
}

async fn queue_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(QueueStatusResponse {
        success: true,
        status: state.dispatcher.queue().status(),
    })
}

fn outcome_response(outcome: DispatchOutcome, kind: TemplateKind) -> Response {
    let (status_code, body) = match outcome {
        DispatchOutcome::Sent { message_id } => {
            (StatusCode::OK, NotificationResponse::sent(message_id))
        }
        DispatchOutcome::Queued { .. } => (StatusCode::ACCEPTED, NotificationResponse::queued()),
        DispatchOutcome::Failed { error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            NotificationResponse::failed(error),
        ),
    };

    (status_code, Json(body.with_template(kind.as_str()))).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
