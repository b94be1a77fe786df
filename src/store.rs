use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

// ── Domain Types ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// Outcome of one payment-processing call. Immutable once stored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub order_id:       String,
    pub amount:         f64,
    pub status:         TransactionStatus,
    pub timestamp:      i64,
}

// ── Transaction Store ─────────────────────────────────────────
// In production, transactions would be persisted to a database.
// For the demo setup, they live in memory and vanish on restart.

pub struct TransactionStore {
    transactions:  Mutex<HashMap<String, TransactionRecord>>,
    last_issue_ms: AtomicI64,
}

impl TransactionStore {
    pub fn new() -> Self {
        TransactionStore {
            transactions:  Mutex::new(HashMap::new()),
            last_issue_ms: AtomicI64::new(0),
        }
    }

    /// Mint a transaction for a processed payment and insert it.
    ///
    /// Declined payments are recorded just like successful ones; only
    /// structurally invalid requests never reach the store.
    pub async fn record(
        &self,
        order_id: String,
        amount: f64,
        status: TransactionStatus,
    ) -> TransactionRecord {
        let issued_ms = self.next_issue_ms();
        let record = TransactionRecord {
            transaction_id: format!("txn_{issued_ms}"),
            order_id,
            amount,
            status,
            timestamp: issued_ms,
        };

        let mut transactions = self.transactions.lock().await;
        transactions.insert(record.transaction_id.clone(), record.clone());
        record
    }

    pub async fn get(&self, transaction_id: &str) -> Option<TransactionRecord> {
        self.transactions.lock().await.get(transaction_id).cloned()
    }

    pub async fn all(&self) -> Vec<TransactionRecord> {
        self.transactions.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.transactions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transactions.lock().await.is_empty()
    }

    // Identifiers are wall-clock millis; a payment landing in the same
    // millisecond as the previous one is bumped forward so ids stay distinct.
    fn next_issue_ms(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_issue_ms.load(Ordering::Relaxed);
        loop {
            let issued = now.max(last + 1);
            match self.last_issue_ms.compare_exchange(
                last,
                issued,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return issued,
                Err(observed) => last = observed,
            }
        }
    }
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn record_then_get_roundtrips() {
        let store = TransactionStore::new();
        let record = store
            .record("order_1".to_string(), 49.99, TransactionStatus::Success)
            .await;
        assert!(record.transaction_id.starts_with("txn_"));

        let fetched = store
            .get(&record.transaction_id)
            .await
            .expect("record should be stored");
        assert_eq!(fetched.order_id, "order_1");
        assert_eq!(fetched.amount, 49.99);
        assert_eq!(fetched.status, TransactionStatus::Success);
        assert_eq!(fetched.timestamp, record.timestamp);
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let store = TransactionStore::new();
        assert!(store.get("txn_does_not_exist").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn same_millisecond_mints_distinct_ids() {
        let store = TransactionStore::new();
        let mut ids = HashSet::new();
        for i in 0..1000 {
            let record = store
                .record(format!("order_{i}"), 1.0, TransactionStatus::Success)
                .await;
            assert!(ids.insert(record.transaction_id));
        }
        assert_eq!(store.len().await, 1000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_all_land() {
        let store = Arc::new(TransactionStore::new());

        let mut handles = Vec::new();
        for i in 0..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .record(format!("order_{i}"), i as f64 + 0.5, TransactionStatus::Success)
                    .await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let record = handle.await.expect("insert task should not panic");
            assert!(ids.insert(record.transaction_id.clone()));

            let fetched = store
                .get(&record.transaction_id)
                .await
                .expect("record should be stored");
            assert_eq!(fetched.order_id, record.order_id);
            assert_eq!(fetched.amount, record.amount);
        }
        assert_eq!(store.len().await, 100);
    }
}
