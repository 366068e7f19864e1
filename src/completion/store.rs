use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::TranslationResult;

#[derive(Default)]
struct Entries {
    results: HashMap<String, TranslationResult>,
    order: Vec<String>,
}

/// In-memory map from transaction id to its extracted result.
///
/// Lives as long as the process. Single-write per id is the watcher's job; the
/// store itself just overwrites.
pub struct ResultStore {
    entries: RwLock<Entries>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
        }
    }

    pub async fn put(&self, transaction_id: &str, result: TranslationResult) {
        let mut entries = self.entries.write().await;
        if entries
            .results
            .insert(transaction_id.to_string(), result)
            .is_none()
        {
            entries.order.push(transaction_id.to_string());
        }
        debug!("💾 Stored result for {}", transaction_id);
    }

    pub async fn get(&self, transaction_id: &str) -> Option<TranslationResult> {
        let entries = self.entries.read().await;
        entries.results.get(transaction_id).cloned()
    }

    /// All results in insertion order
    pub async fn all(&self) -> Vec<(String, TranslationResult)> {
        let entries = self.entries.read().await;
        entries
            .order
            .iter()
            .filter_map(|id| {
                entries
                    .results
                    .get(id)
                    .map(|result| (id.clone(), result.clone()))
            })
            .collect()
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str) -> TranslationResult {
        TranslationResult {
            translated_text: text.to_string(),
            target_language: "es".to_string(),
            source_language: "en".to_string(),
            confidence: 95.0,
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = ResultStore::new();
        assert!(store.get("tx-1").await.is_none());

        store.put("tx-1", result("Hola")).await;
        assert_eq!(store.get("tx-1").await.unwrap().translated_text, "Hola");
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_all_in_insertion_order() {
        let store = ResultStore::new();
        store.put("tx-b", result("uno")).await;
        store.put("tx-a", result("dos")).await;
        store.put("tx-b", result("tres")).await;

        let all = store.all().await;
        let ids: Vec<&str> = all.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["tx-b", "tx-a"]);
        assert_eq!(all[0].1.translated_text, "tres");
    }
}
