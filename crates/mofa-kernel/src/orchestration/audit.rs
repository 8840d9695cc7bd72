//! Execution Audit Store (§4.H, optional component): records completed
//! `ExecutionResult`s for later inspection. Grounded on
//! [`crate::workflow::telemetry::SessionRecorder`]'s append-then-cap pattern —
//! a bounded ring rather than an unbounded `Vec`, so long-running processes
//! cannot leak memory through this store.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::OrchestrationResult;
use super::traits::ExecutionStore;
use super::types::ExecutionResult;

const DEFAULT_CAPACITY: usize = 1_000;

/// In-process `ExecutionStore`. Newest-first on read; oldest entries are
/// evicted once `capacity` is reached (§4.H: "retention is a deployment
/// concern, not a core one" — the cap keeps the default in-memory store from
/// being that deployment concern by accident).
pub struct InMemoryExecutionStore {
    records: Arc<RwLock<VecDeque<ExecutionResult>>>,
    capacity: usize,
}

impl Default for InMemoryExecutionStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InMemoryExecutionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)))),
            capacity: capacity.max(1),
        }
    }
}

#[async_trait::async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn record(&self, result: &ExecutionResult) -> OrchestrationResult<()> {
        let mut guard = self.records.write();
        guard.push_front(result.clone());
        while guard.len() > self.capacity {
            guard.pop_back();
        }
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> OrchestrationResult<Vec<ExecutionResult>> {
        Ok(self.records.read().iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fixture(plan_id: &str) -> ExecutionResult {
        ExecutionResult {
            plan_id: plan_id.to_string(),
            success: true,
            total_duration_ms: 10,
            steps: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn list_recent_returns_newest_first() {
        let store = InMemoryExecutionStore::default();
        store.record(&fixture("p1")).await.unwrap();
        store.record(&fixture("p2")).await.unwrap();
        let recent = store.list_recent(10).await.unwrap();
        assert_eq!(recent[0].plan_id, "p2");
        assert_eq!(recent[1].plan_id, "p1");
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let store = InMemoryExecutionStore::new(2);
        store.record(&fixture("p1")).await.unwrap();
        store.record(&fixture("p2")).await.unwrap();
        store.record(&fixture("p3")).await.unwrap();
        let recent = store.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].plan_id, "p3");
        assert_eq!(recent[1].plan_id, "p2");
    }

    #[tokio::test]
    async fn list_recent_respects_limit() {
        let store = InMemoryExecutionStore::default();
        for i in 0..5 {
            store.record(&fixture(&format!("p{i}"))).await.unwrap();
        }
        assert_eq!(store.list_recent(2).await.unwrap().len(), 2);
    }
}
