use crate::generation::model::CandidateBatch;
use tokio::sync::Mutex;
use tracing::info;

/// Holds the one batch of candidates currently awaiting review.
#[derive(Default)]
pub struct ReviewSlot {
    pending: Mutex<Option<CandidateBatch>>,
}

impl ReviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `batch`, replacing any batch nobody reviewed.
    pub async fn stage(&self, batch: CandidateBatch) {
        let mut pending = self.pending.lock().await;
        if let Some(stale) = pending.replace(batch) {
            info!(
                "discarding unreviewed batch {} with {} candidates",
                stale.id,
                stale.candidates.len()
            );
        }
    }

    pub async fn pending(&self) -> Option<CandidateBatch> {
        self.pending.lock().await.clone()
    }

    /// Removes and returns the batch, provided it is still the staged one.
    pub async fn take(&self, batch_id: &str) -> Option<CandidateBatch> {
        let mut pending = self.pending.lock().await;
        match pending.as_ref() {
            Some(batch) if batch.id == batch_id => pending.take(),
            _ => None,
        }
    }

    /// Puts a taken batch back unless a newer one was staged meanwhile.
    pub async fn restore(&self, batch: CandidateBatch) {
        let mut pending = self.pending.lock().await;
        if pending.is_none() {
            *pending = Some(batch);
        }
    }

    pub async fn discard(&self, batch_id: &str) -> bool {
        self.take(batch_id).await.is_some()
    }
}
