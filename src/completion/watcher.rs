// Completion Watcher - turns COMPLETED ledger transactions into stored results
//
// Each tick:
// 1. List transactions on the ledger
// 2. Keep the ones this agent initiated that are COMPLETED and not yet processed
// 3. For each candidate, fetch its messages and extract the result
// 4. Store the result and mark the transaction processed
//
// A candidate that fails (network, bad payload shape from the ledger) is left
// unprocessed and picked up again on the next tick. A candidate with no usable
// completion is marked processed and never looked at again.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::{extract, ResultStore};
use crate::config::AgentConfig;
use crate::ledger::{
    models::{Transaction, TransactionState},
    Ledger, LedgerResult,
};

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Identity this agent initiates transactions as
    pub agent_did: String,
    pub poll_interval: Duration,
    /// Initial value of the runtime enable flag
    pub polling_enabled: bool,
    pub auto_settle: bool,
}

impl From<&AgentConfig> for WatcherConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            agent_did: config.agent_did.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            polling_enabled: config.polling_enabled,
            auto_settle: config.auto_settle,
        }
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub candidates: usize,
    /// Result extracted and stored
    pub resolved: usize,
    /// No usable completion; marked processed without a result
    pub unresolved: usize,
    /// Errored; left for the next tick
    pub failed: usize,
    /// Another tick was still running
    pub skipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Resolved,
    Unresolved,
}

pub struct CompletionWatcher {
    config: WatcherConfig,
    ledger: Arc<dyn Ledger>,
    store: Arc<ResultStore>,
    processed: Mutex<HashSet<String>>,
    enabled: AtomicBool,
    tick_guard: tokio::sync::Mutex<()>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CompletionWatcher {
    pub fn new(config: WatcherConfig, ledger: Arc<dyn Ledger>, store: Arc<ResultStore>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            enabled: AtomicBool::new(config.polling_enabled),
            config,
            ledger,
            store,
            processed: Mutex::new(HashSet::new()),
            tick_guard: tokio::sync::Mutex::new(()),
            shutdown,
            task: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        info!("🔀 Polling enabled changed: {}", enabled);
    }

    pub fn is_processed(&self, transaction_id: &str) -> bool {
        self.processed.lock().contains(transaction_id)
    }

    /// Start the ticker in the background. No-op if it is already running.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        self.shutdown.send_replace(false);
        let shutdown = self.shutdown.subscribe();
        let watcher = Arc::clone(self);

        info!(
            "⏰ Starting completion watcher (every {} ms)",
            self.config.poll_interval.as_millis()
        );
        *task = Some(tokio::spawn(watcher.run(shutdown)));
    }

    /// Stop scheduling ticks. A tick already in progress runs to completion.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
        if self.task.lock().take().is_some() {
            info!("⏹️ Stopping completion watcher");
        }
    }

    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            if !self.is_enabled() {
                continue;
            }

            if let Err(e) = self.process_once().await {
                error!("❌ Polling tick failed: {}", e);
            }
        }

        info!("✓ Completion watcher stopped");
    }

    /// Eligibility against the latest snapshot: ours, COMPLETED, not yet processed.
    pub fn should_process(&self, tx: &Transaction) -> bool {
        tx.is_initiated_by(&self.config.agent_did)
            && tx.state == TransactionState::Completed
            && !self.is_processed(&tx.id)
    }

    /// Run one tick. Only a failure to list transactions is returned; per-candidate
    /// failures are logged and counted.
    pub async fn process_once(&self) -> LedgerResult<TickSummary> {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            debug!("⏭️ Previous tick still running, skipping");
            return Ok(TickSummary {
                skipped: true,
                ..TickSummary::default()
            });
        };

        let transactions = self.ledger.list_transactions().await?;
        let candidates: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| self.should_process(tx))
            .collect();

        let mut summary = TickSummary {
            candidates: candidates.len(),
            ..TickSummary::default()
        };
        if candidates.is_empty() {
            return Ok(summary);
        }

        debug!("📊 Found {} completed transactions to process", candidates.len());

        for tx in &candidates {
            match self.process_transaction(tx).await {
                Ok(Outcome::Resolved) => summary.resolved += 1,
                Ok(Outcome::Unresolved) => summary.unresolved += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(tx_id = %tx.id, "❌ Processing failed: {}", e);
                }
            }
        }

        Ok(summary)
    }

    #[instrument(skip(self, tx), fields(tx_id = %tx.id))]
    async fn process_transaction(&self, tx: &Transaction) -> LedgerResult<Outcome> {
        info!("⚙️ Processing completed transaction (state {})", tx.state);

        let messages = self.ledger.get_messages(&tx.id).await?;

        let Some(result) = extract(&messages) else {
            warn!("⚠️ No work result found in messages");
            self.processed.lock().insert(tx.id.clone());
            return Ok(Outcome::Unresolved);
        };

        info!(
            translated_text = %result.translated_text,
            target_language = %result.target_language,
            source_language = %result.source_language,
            confidence = result.confidence,
            "✅ Translation completed"
        );

        self.processed.lock().insert(tx.id.clone());
        self.store.put(&tx.id, result).await;

        if self.config.auto_settle {
            match self.ledger.settle_transaction(&tx.id).await {
                Ok(settled) => info!("💰 Settled transaction (state {})", settled.state),
                Err(e) => warn!("⚠️ Settlement failed, result kept: {}", e),
            }
        }

        Ok(Outcome::Resolved)
    }
}
