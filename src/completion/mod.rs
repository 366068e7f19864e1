// Completion pipeline: watch the ledger, extract results, keep them in memory
pub mod extractor;
pub mod store;
pub mod watcher;

use serde::{Deserialize, Serialize};

pub use extractor::extract;
pub use store::ResultStore;
pub use watcher::{CompletionWatcher, WatcherConfig};

/// Canonical translation outcome, whatever shape the responder sent it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
    pub target_language: String,
    pub source_language: String,
    pub confidence: f64,
}
