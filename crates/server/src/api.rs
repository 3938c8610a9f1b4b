//! JSON API for the conversational cart. One route runs an utterance against
//! a session cart, one reads the cart back, one hot-swaps the parser
//! vocabulary from configuration.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use cartwright_core::config::{AppConfig, LoadOptions};
use cartwright_core::domain::cart::SessionId;
use cartwright_core::domain::command::{CartLine, CommandReceipt};
use cartwright_core::engine::CartCommandEngine;
use cartwright_core::errors::{EngineError, InterfaceError};
use cartwright_core::vocabulary::VocabularyStore;

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<CartCommandEngine>,
    pub vocabulary: Arc<VocabularyStore>,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub session_id: String,
    pub cart: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub vocabulary_version: u32,
}

pub fn router(engine: Arc<CartCommandEngine>, vocabulary: Arc<VocabularyStore>) -> Router {
    Router::new()
        .route("/api/cart/command", post(run_command))
        .route("/api/cart/{session_id}", get(get_cart))
        .route("/api/vocabulary/reload", post(reload_vocabulary))
        .with_state(ApiState { engine, vocabulary })
}

async fn run_command(
    State(state): State<ApiState>,
    Json(body): Json<CommandRequest>,
) -> Result<Json<CommandReceipt>, (StatusCode, Json<ApiError>)> {
    let correlation_id = new_correlation_id();

    let session_id = body.session_id.trim();
    if session_id.is_empty() {
        return Err(bad_request("session_id is required", correlation_id));
    }
    if body.text.trim().is_empty() {
        return Err(bad_request("text is required", correlation_id));
    }

    let session = SessionId(session_id.to_string());
    let receipt = state
        .engine
        .handle_utterance(&session, &body.text)
        .await
        .map_err(|error| engine_failure(error, &session, correlation_id.clone()))?;

    info!(
        event_name = "api.cart.command_processed",
        correlation_id = %correlation_id,
        session_id = %session.0,
        action = %receipt.action,
        success = receipt.success,
        "cart command processed"
    );
    Ok(Json(receipt))
}

async fn get_cart(
    Path(session_id): Path<String>,
    State(state): State<ApiState>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ApiError>)> {
    let correlation_id = new_correlation_id();
    let session = SessionId(session_id);

    let cart = state
        .engine
        .cart_snapshot(&session)
        .await
        .map_err(|error| engine_failure(error, &session, correlation_id))?;

    let lines = cart
        .entries
        .iter()
        .map(|entry| CartLine {
            product_name: entry.product_name.clone(),
            quantity: entry.quantity,
            unit_price: entry.unit_price,
            line_total: entry.line_total(),
        })
        .collect();

    Ok(Json(CartResponse { session_id: session.0, cart: lines }))
}

/// Re-reads the configuration and swaps a freshly built vocabulary snapshot
/// into the store. In-flight commands keep the snapshot they started with.
async fn reload_vocabulary(
    State(state): State<ApiState>,
) -> Result<Json<ReloadResponse>, (StatusCode, Json<ApiError>)> {
    let correlation_id = new_correlation_id();

    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        warn!(
            event_name = "api.vocabulary.reload_failed",
            correlation_id = %correlation_id,
            error = %error,
            "vocabulary reload could not re-read configuration"
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: "could not load configuration".to_string(),
                correlation_id: correlation_id.clone(),
            }),
        )
    })?;

    let version = state.vocabulary.reload(&config.vocabulary).await;
    info!(
        event_name = "api.vocabulary.reloaded",
        correlation_id = %correlation_id,
        vocabulary_version = version,
        "vocabulary snapshot swapped"
    );
    Ok(Json(ReloadResponse { vocabulary_version: version }))
}

fn bad_request(message: &str, correlation_id: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message.to_string(), correlation_id }))
}

fn engine_failure(
    error: EngineError,
    session: &SessionId,
    correlation_id: String,
) -> (StatusCode, Json<ApiError>) {
    let interface = error.into_interface(correlation_id.clone());
    warn!(
        event_name = "api.cart.command_failed",
        correlation_id = %correlation_id,
        session_id = %session.0,
        error = %interface,
        "cart command failed"
    );
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiError { error: interface.user_message().to_string(), correlation_id }))
}

fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}
