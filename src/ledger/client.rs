use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use super::models::*;
use crate::error::LedgerError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Typed access to the remote transaction ledger.
///
/// Every call is a single request with no retries. Implementations must hand back
/// fully decoded values or an error, never a partially checked body.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn list_transactions(&self) -> LedgerResult<Vec<Transaction>>;

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Transaction>;

    async fn get_messages(&self, transaction_id: &str) -> LedgerResult<Vec<Message>>;

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> LedgerResult<Transaction>;

    async fn post_message(
        &self,
        transaction_id: &str,
        message_type: MessageType,
        payload: Value,
    ) -> LedgerResult<Message>;

    /// Move a transaction to `SETTLED`
    async fn settle_transaction(&self, transaction_id: &str) -> LedgerResult<Transaction>;
}

/// HTTP implementation of [`Ledger`] over the ledger's REST API.
pub struct LedgerClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl LedgerClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        authenticated: bool,
    ) -> LedgerResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header("content-type", "application/json");
        if authenticated {
            builder = builder.bearer_auth(&self.api_key);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        if status >= 400 {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".into());
            return Err(LedgerError::HttpStatus { code: status, body });
        }

        let text = response.text().await?;
        debug!("{} {} -> {} ({} bytes)", method, path, status, text.len());

        if text.trim().is_empty() {
            return Err(LedgerError::Protocol(format!(
                "{} {} returned an empty body",
                method, path
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| LedgerError::Protocol(format!("{} {}: {}", method, path, e)))
    }

    fn encode<B: serde::Serialize>(body: &B) -> LedgerResult<Value> {
        serde_json::to_value(body)
            .map_err(|e| LedgerError::Protocol(format!("failed to encode request: {}", e)))
    }
}

#[async_trait]
impl Ledger for LedgerClient {
    async fn list_transactions(&self) -> LedgerResult<Vec<Transaction>> {
        self.request(Method::GET, "/api/transactions", None, false)
            .await
    }

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Transaction> {
        let path = format!("/api/transactions/{}", transaction_id);
        self.request(Method::GET, &path, None, true).await
    }

    async fn get_messages(&self, transaction_id: &str) -> LedgerResult<Vec<Message>> {
        let path = format!("/api/transactions/{}/messages", transaction_id);
        self.request(Method::GET, &path, None, true).await
    }

    #[instrument(skip(self, request), fields(responder = %request.responder_did))]
    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> LedgerResult<Transaction> {
        let body = Self::encode(request)?;
        self.request(Method::POST, "/api/agents/transactions", Some(body), true)
            .await
    }

    async fn post_message(
        &self,
        transaction_id: &str,
        message_type: MessageType,
        payload: Value,
    ) -> LedgerResult<Message> {
        let path = format!("/api/transactions/{}/messages", transaction_id);
        let body = Self::encode(&PostMessageRequest {
            message_type,
            payload,
            signature: format!("sig-{}", Utc::now().timestamp_millis()),
        })?;
        self.request(Method::POST, &path, Some(body), true).await
    }

    async fn settle_transaction(&self, transaction_id: &str) -> LedgerResult<Transaction> {
        let path = format!("/api/transactions/{}/state", transaction_id);
        let body = Self::encode(&StateTransitionRequest {
            state: TransactionState::Settled,
        })?;
        self.request(Method::PATCH, &path, Some(body), true).await
    }
}
