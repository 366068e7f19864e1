//! In-memory ledger double for watcher and API tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

use super::client::{Ledger, LedgerResult};
use super::models::*;
use crate::error::LedgerError;

#[derive(Default)]
struct FakeState {
    transactions: Vec<Transaction>,
    messages: HashMap<String, Vec<Message>>,
    unreachable: HashSet<String>,
    list_unreachable: bool,
    create_failing: bool,
    settle_failing: bool,
    message_fetches: HashMap<String, usize>,
    created: Vec<CreateTransactionRequest>,
    settled: Vec<String>,
}

#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<FakeState>,
}

/// A genuine connection-refused error from reqwest.
pub async fn transport_error() -> LedgerError {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = reqwest::Client::new()
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap_err();
    LedgerError::Transport(err)
}

pub fn transaction(id: &str, initiator: &str, state: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        initiator_did: initiator.to_string(),
        responder_did: Some("did:agent:translator".to_string()),
        state: TransactionState::from(state.to_string()),
        description: None,
        amount: Some(100.0),
        metadata: None,
        work_result: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn completion(transaction_id: &str, payload: Value) -> Message {
    Message {
        id: format!("{}-m", transaction_id),
        transaction_id: transaction_id.to_string(),
        sender_did: "did:agent:translator".to_string(),
        message_type: MessageType::Complete,
        payload: Some(payload),
        signature: None,
        created_at: None,
    }
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&self, tx: Transaction) {
        self.state.lock().transactions.push(tx);
    }

    pub fn set_state(&self, transaction_id: &str, state: TransactionState) {
        let mut guard = self.state.lock();
        if let Some(tx) = guard.transactions.iter_mut().find(|tx| tx.id == transaction_id) {
            tx.state = state;
        }
    }

    pub fn push_message(&self, message: Message) {
        self.state
            .lock()
            .messages
            .entry(message.transaction_id.clone())
            .or_default()
            .push(message);
    }

    pub fn set_unreachable(&self, transaction_id: &str, unreachable: bool) {
        let mut guard = self.state.lock();
        if unreachable {
            guard.unreachable.insert(transaction_id.to_string());
        } else {
            guard.unreachable.remove(transaction_id);
        }
    }

    pub fn set_list_unreachable(&self, unreachable: bool) {
        self.state.lock().list_unreachable = unreachable;
    }

    pub fn set_create_failing(&self, failing: bool) {
        self.state.lock().create_failing = failing;
    }

    pub fn set_settle_failing(&self, failing: bool) {
        self.state.lock().settle_failing = failing;
    }

    pub fn message_fetches(&self, transaction_id: &str) -> usize {
        self.state
            .lock()
            .message_fetches
            .get(transaction_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn created(&self) -> Vec<CreateTransactionRequest> {
        self.state.lock().created.clone()
    }

    pub fn settled(&self) -> Vec<String> {
        self.state.lock().settled.clone()
    }

    fn find(&self, transaction_id: &str) -> LedgerResult<Transaction> {
        self.state
            .lock()
            .transactions
            .iter()
            .find(|tx| tx.id == transaction_id)
            .cloned()
            .ok_or_else(|| LedgerError::HttpStatus {
                code: 404,
                body: "transaction not found".to_string(),
            })
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn list_transactions(&self) -> LedgerResult<Vec<Transaction>> {
        let unreachable = self.state.lock().list_unreachable;
        if unreachable {
            return Err(transport_error().await);
        }
        Ok(self.state.lock().transactions.clone())
    }

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Transaction> {
        self.find(transaction_id)
    }

    async fn get_messages(&self, transaction_id: &str) -> LedgerResult<Vec<Message>> {
        let unreachable = {
            let mut guard = self.state.lock();
            *guard
                .message_fetches
                .entry(transaction_id.to_string())
                .or_default() += 1;
            guard.unreachable.contains(transaction_id)
        };
        if unreachable {
            return Err(transport_error().await);
        }

        Ok(self
            .state
            .lock()
            .messages
            .get(transaction_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> LedgerResult<Transaction> {
        let mut guard = self.state.lock();
        if guard.create_failing {
            return Err(LedgerError::HttpStatus {
                code: 401,
                body: "invalid api key sk-test-secret".to_string(),
            });
        }
        guard.created.push(request.clone());

        let tx = Transaction {
            id: format!("tx-created-{}", guard.created.len()),
            initiator_did: "did:agent:requester".to_string(),
            responder_did: Some(request.responder_did.clone()),
            state: TransactionState::Pending,
            description: Some(request.description.clone()),
            amount: Some(request.amount),
            metadata: request.metadata.clone(),
            work_result: None,
            created_at: None,
            updated_at: None,
        };
        guard.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn post_message(
        &self,
        transaction_id: &str,
        message_type: MessageType,
        payload: Value,
    ) -> LedgerResult<Message> {
        self.find(transaction_id)?;
        let message = Message {
            id: format!("{}-posted", transaction_id),
            transaction_id: transaction_id.to_string(),
            sender_did: "did:agent:requester".to_string(),
            message_type,
            payload: Some(payload),
            signature: Some("sig-0".to_string()),
            created_at: None,
        };
        self.push_message(message.clone());
        Ok(message)
    }

    async fn settle_transaction(&self, transaction_id: &str) -> LedgerResult<Transaction> {
        self.find(transaction_id)?;
        if self.state.lock().settle_failing {
            return Err(LedgerError::HttpStatus {
                code: 500,
                body: "settlement unavailable".to_string(),
            });
        }
        self.set_state(transaction_id, TransactionState::Settled);
        self.state.lock().settled.push(transaction_id.to_string());
        self.find(transaction_id)
    }
}

#[tokio::test]
async fn test_fake_ledger_settles_and_posts() {
    let ledger = FakeLedger::new();
    ledger.add_transaction(transaction("tx-1", "did:agent:requester", "COMPLETED"));

    let message = ledger
        .post_message("tx-1", MessageType::Complete, json!({"translation": "Hola"}))
        .await
        .unwrap();
    assert!(message.is_completion());
    assert_eq!(ledger.get_messages("tx-1").await.unwrap().len(), 1);

    let tx = ledger.settle_transaction("tx-1").await.unwrap();
    assert_eq!(tx.state, TransactionState::Settled);
    assert_eq!(ledger.settled(), vec!["tx-1".to_string()]);
}
