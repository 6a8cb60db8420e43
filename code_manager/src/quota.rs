//! Per-(learner, question) cap on full hidden-test runs.
//!
//! The counter lives behind [`RunCounterStore`] so a deployment can keep it in
//! its own database; [`InMemoryRunCounterStore`] serves the binary and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    #[error("Hidden test run limit reached ({limit} per question)")]
    Exhausted { limit: u32 },
    #[error("Run counter store failure: {0}")]
    Store(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuotaKey {
    pub learner_id: String,
    pub question_id: String,
}

impl QuotaKey {
    pub fn new(learner_id: impl Into<String>, question_id: impl Into<String>) -> Self {
        Self {
            learner_id: learner_id.into(),
            question_id: question_id.into(),
        }
    }
}

#[async_trait]
pub trait RunCounterStore: Send + Sync {
    /// Atomically increments the counter for `key` unless it already reached
    /// `limit`. Returns the new count, or `None` when the limit was reached.
    async fn increment_below(&self, key: &QuotaKey, limit: u32) -> Result<Option<u32>, QuotaError>;

    async fn count(&self, key: &QuotaKey) -> Result<u32, QuotaError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRunCounterStore {
    counts: Mutex<HashMap<QuotaKey, u32>>,
}

#[async_trait]
impl RunCounterStore for InMemoryRunCounterStore {
    async fn increment_below(&self, key: &QuotaKey, limit: u32) -> Result<Option<u32>, QuotaError> {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(key.clone()).or_insert(0);
        if *count >= limit {
            return Ok(None);
        }
        *count += 1;
        Ok(Some(*count))
    }

    async fn count(&self, key: &QuotaKey) -> Result<u32, QuotaError> {
        Ok(self.counts.lock().await.get(key).copied().unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUsage {
    pub used: u32,
    pub remaining: u32,
    pub limit: u32,
}

#[derive(Clone)]
pub struct RunQuota {
    store: Arc<dyn RunCounterStore>,
    limit: u32,
}

impl RunQuota {
    pub fn new(store: Arc<dyn RunCounterStore>, limit: u32) -> Self {
        Self { store, limit }
    }

    pub fn in_memory(limit: u32) -> Self {
        Self::new(Arc::new(InMemoryRunCounterStore::default()), limit)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Records one hidden run for `key`.
    ///
    /// # Errors
    /// [`QuotaError::Exhausted`] once `limit` runs were recorded; nothing is counted then.
    pub async fn consume(&self, key: &QuotaKey) -> Result<QuotaUsage, QuotaError> {
        match self.store.increment_below(key, self.limit).await? {
            Some(used) => {
                info!(
                    learner_id = %key.learner_id,
                    question_id = %key.question_id,
                    used,
                    limit = self.limit,
                    "Hidden run recorded"
                );
                Ok(self.usage(used))
            }
            None => {
                warn!(
                    learner_id = %key.learner_id,
                    question_id = %key.question_id,
                    limit = self.limit,
                    "Hidden run limit reached"
                );
                Err(QuotaError::Exhausted { limit: self.limit })
            }
        }
    }

    pub async fn usage_for(&self, key: &QuotaKey) -> Result<QuotaUsage, QuotaError> {
        let used = self.store.count(key).await?;
        Ok(self.usage(used))
    }

    fn usage(&self, used: u32) -> QuotaUsage {
        QuotaUsage {
            used,
            remaining: self.limit.saturating_sub(used),
            limit: self.limit,
        }
    }
}
