use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction lifecycle state as reported by the ledger.
///
/// The ledger owns the state machine. Only the states this agent reacts to get
/// their own variant; anything else is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionState {
    Pending,
    Completed,
    Settled,
    Other(String),
}

impl TransactionState {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionState::Pending => "PENDING",
            TransactionState::Completed => "COMPLETED",
            TransactionState::Settled => "SETTLED",
            TransactionState::Other(state) => state,
        }
    }
}

impl From<String> for TransactionState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "PENDING" => TransactionState::Pending,
            "COMPLETED" => TransactionState::Completed,
            "SETTLED" => TransactionState::Settled,
            _ => TransactionState::Other(state),
        }
    }
}

impl From<TransactionState> for String {
    fn from(state: TransactionState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message type on a transaction's message log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    /// Completion signal carrying the work outcome
    Complete,
    Other(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::Complete => "COMPLETE",
            MessageType::Other(kind) => kind,
        }
    }
}

impl From<String> for MessageType {
    fn from(kind: String) -> Self {
        if kind == "COMPLETE" {
            MessageType::Complete
        } else {
            MessageType::Other(kind)
        }
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        kind.as_str().to_string()
    }
}

/// Read-only snapshot of a ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub initiator_did: String,
    pub responder_did: Option<String>,
    pub state: TransactionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Transaction {
    pub fn is_initiated_by(&self, did: &str) -> bool {
        self.initiator_did == did
    }
}

/// One entry of a transaction's append-only message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub transaction_id: String,
    pub sender_did: String,
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Message {
    pub fn is_completion(&self) -> bool {
        self.message_type == MessageType::Complete
    }
}

// ========== REQUEST BODIES ==========

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub responder_did: String,
    pub description: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateTransitionRequest {
    pub state: TransactionState,
}
