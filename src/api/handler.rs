use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::models::*;
use crate::{
    completion::{CompletionWatcher, ResultStore},
    error::{AppError, AppResult},
    ledger::{models::CreateTransactionRequest, Ledger},
};

/// Amount offered when the caller does not name one
pub const DEFAULT_AMOUNT: f64 = 100.0;

#[derive(Clone)]
pub struct AppState {
    pub watcher: Arc<CompletionWatcher>,
    pub store: Arc<ResultStore>,
    pub ledger: Arc<dyn Ledger>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<PollingResponse> {
    Json(PollingResponse {
        ok: true,
        polling_enabled: state.watcher.is_enabled(),
    })
}

/// POST /polling/enable
pub async fn enable_polling(State(state): State<AppState>) -> Json<PollingResponse> {
    state.watcher.set_enabled(true);
    Json(PollingResponse {
        ok: true,
        polling_enabled: true,
    })
}

/// POST /polling/disable
pub async fn disable_polling(State(state): State<AppState>) -> Json<PollingResponse> {
    state.watcher.set_enabled(false);
    Json(PollingResponse {
        ok: true,
        polling_enabled: false,
    })
}

/// Open a translation transaction with a responder agent
/// POST /create-translation
///
/// The request itself becomes the transaction description, so the responder
/// reads text and languages straight off the ledger.
pub async fn create_translation(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<CreateTranslationResponse>> {
    let request: CreateTranslationRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;

    request.validate().map_err(|_| {
        AppError::BadRequest(
            "Missing required fields: responderDid, text, targetLanguage".to_string(),
        )
    })?;

    let description = serde_json::to_string(&TranslationRequest {
        text: &request.text,
        target_language: &request.target_language,
        source_language: request.source_language.as_deref(),
    })?;

    let amount = request
        .amount
        .filter(|amount| *amount != 0.0 && !amount.is_nan())
        .unwrap_or(DEFAULT_AMOUNT);

    let transaction = state
        .ledger
        .create_transaction(&CreateTransactionRequest {
            responder_did: request.responder_did.clone(),
            description,
            amount,
            metadata: None,
        })
        .await?;

    info!(
        "📝 Created translation transaction {} with {}",
        transaction.id, request.responder_did
    );

    Ok(Json(CreateTranslationResponse {
        ok: true,
        transaction,
    }))
}

/// GET /results
pub async fn list_results(State(state): State<AppState>) -> Json<ResultsResponse> {
    let results = state
        .store
        .all()
        .await
        .into_iter()
        .map(|(transaction_id, result)| ResultEntry {
            transaction_id,
            result,
        })
        .collect();

    Json(ResultsResponse { ok: true, results })
}

/// GET /results/ with nothing after the slash
pub async fn invalid_result_id() -> AppError {
    AppError::BadRequest("Invalid transaction ID".to_string())
}

/// GET /results/:id
pub async fn get_result(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> AppResult<Json<ResultResponse>> {
    let result = state
        .store
        .get(&transaction_id)
        .await
        .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;

    Ok(Json(ResultResponse {
        ok: true,
        transaction_id,
        result,
    }))
}

/// Anything that does not match a route and method
pub async fn not_found() -> AppError {
    AppError::NotFound("not found".to_string())
}
