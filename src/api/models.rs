use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::completion::TranslationResult;
use crate::ledger::models::Transaction;

// ========== REQUEST MODELS ==========

/// Request to open a translation transaction with a responder agent
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTranslationRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub responder_did: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub text: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub target_language: String,

    pub source_language: Option<String>,

    /// Price offered; zero or absent means the default
    pub amount: Option<f64>,
}

/// Work description stored on the ledger transaction (as JSON text)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub target_language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<&'a str>,
}

// ========== RESPONSE MODELS ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingResponse {
    pub ok: bool,
    pub polling_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateTranslationResponse {
    pub ok: bool,
    pub transaction: Transaction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub transaction_id: String,
    #[serde(flatten)]
    pub result: TranslationResult,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub ok: bool,
    pub results: Vec<ResultEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub ok: bool,
    pub transaction_id: String,
    pub result: TranslationResult,
}
