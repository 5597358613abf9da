// SPDX-License-Identifier: AGPL-3.0
// Civet Client - Debounced split synchronization
//
// Every toggle pushes the FULL current split state, so a burst of toggles
// only needs one outbound request: the scheduler waits for a quiet period
// and submits whatever state is newest. Each request carries a monotonic
// sequence number so the server can discard a stale request that arrives
// after a newer one.

use crate::api::ApiClient;
use async_trait::async_trait;
use civet_core::{AppError, SplitItem, SplitMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One replace-splits submission: the complete assignment state for a
/// receipt at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSyncRequest {
    pub receipt_id: String,
    pub seq: u64,
    pub items: Vec<SplitItem>,
}

/// Outbound seam for split submissions
#[async_trait]
pub trait SplitSink: Send + Sync {
    async fn submit_split(&self, request: SplitSyncRequest) -> Result<(), AppError>;
}

#[async_trait]
impl SplitSink for ApiClient {
    async fn submit_split(&self, request: SplitSyncRequest) -> Result<(), AppError> {
        self.replace_splits(&request).await
    }
}

/// Coalesces split updates into at most one submission per quiet period
pub struct SyncScheduler {
    tx: mpsc::UnboundedSender<SplitMap>,
    worker: JoinHandle<()>,
}

impl SyncScheduler {
    pub fn new(sink: Arc<dyn SplitSink>, receipt_id: String, quiet_period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(sink, receipt_id, quiet_period, rx));
        Self { tx, worker }
    }

    /// Record the latest state for submission. Never blocks; states queued
    /// within one quiet period supersede each other.
    pub fn schedule(&self, state: &SplitMap) {
        if self.tx.send(state.clone()).is_err() {
            tracing::warn!("Sync worker is gone, dropping split update");
        }
    }

    /// Submit any pending state and wait for the worker to finish
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            tracing::warn!("Sync worker task failed: {}", e);
        }
    }
}

async fn run_worker(
    sink: Arc<dyn SplitSink>,
    receipt_id: String,
    quiet_period: Duration,
    mut rx: mpsc::UnboundedReceiver<SplitMap>,
) {
    let mut seq: u64 = 0;

    while let Some(mut latest) = rx.recv().await {
        // Absorb further updates until a full quiet period passes with none,
        // or the channel closes (then flush immediately).
        loop {
            match tokio::time::timeout(quiet_period, rx.recv()).await {
                Ok(Some(newer)) => latest = newer,
                Ok(None) => break,
                Err(_) => break,
            }
        }

        seq += 1;
        let request = SplitSyncRequest {
            receipt_id: receipt_id.clone(),
            seq,
            items: latest.sync_items(),
        };

        tracing::debug!(
            "Submitting split state seq={} ({} assignments)",
            request.seq,
            request.items.len()
        );

        // No automatic retry: the next toggle carries the full state anyway.
        if let Err(e) = sink.submit_split(request).await {
            tracing::warn!("Split sync failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        submissions: Mutex<Vec<SplitSyncRequest>>,
    }

    #[async_trait]
    impl SplitSink for RecordingSink {
        async fn submit_split(&self, request: SplitSyncRequest) -> Result<(), AppError> {
            self.submissions.lock().unwrap().push(request);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingSink;

    #[async_trait]
    impl SplitSink for FailingSink {
        async fn submit_split(&self, _request: SplitSyncRequest) -> Result<(), AppError> {
            Err(AppError::Network("boom".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_toggles_yields_one_submission() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = SyncScheduler::new(
            sink.clone(),
            "r1".to_string(),
            Duration::from_millis(500),
        );

        let mut state = SplitMap::new();
        for friend in ["f1", "f2", "f3"] {
            state = state.toggle("i1", friend);
            scheduler.schedule(&state);
        }

        tokio::time::sleep(Duration::from_millis(600)).await;

        let submissions = sink.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].seq, 1);
        // Carries the state after the last toggle, not the first.
        assert_eq!(submissions[0].items.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_within_window_supersedes_and_restarts_timer() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = SyncScheduler::new(
            sink.clone(),
            "r1".to_string(),
            Duration::from_millis(500),
        );

        let first = SplitMap::new().toggle("i1", "f1");
        scheduler.schedule(&first);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = first.toggle("i2", "f2");
        scheduler.schedule(&second);

        // 300ms in, nothing submitted yet; the second schedule restarted the
        // window.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(sink.submissions.lock().unwrap().len(), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let submissions = sink.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].items, second.sync_items());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_get_increasing_seq() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = SyncScheduler::new(
            sink.clone(),
            "r1".to_string(),
            Duration::from_millis(500),
        );

        let first = SplitMap::new().toggle("i1", "f1");
        scheduler.schedule(&first);
        tokio::time::sleep(Duration::from_millis(600)).await;

        let second = first.toggle("i1", "f2");
        scheduler.schedule(&second);
        tokio::time::sleep(Duration::from_millis(600)).await;

        let submissions = sink.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].seq, 1);
        assert_eq!(submissions[1].seq, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_pending_state() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = SyncScheduler::new(
            sink.clone(),
            "r1".to_string(),
            Duration::from_millis(500),
        );

        let state = SplitMap::new().toggle("i1", "f1");
        scheduler.schedule(&state);
        scheduler.close().await;

        let submissions = sink.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].receipt_id, "r1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sink_failure_does_not_kill_the_worker() {
        let sink = Arc::new(FailingSink);
        let scheduler = SyncScheduler::new(sink, "r1".to_string(), Duration::from_millis(500));

        scheduler.schedule(&SplitMap::new().toggle("i1", "f1"));
        tokio::time::sleep(Duration::from_millis(600)).await;

        // A second update still goes through the worker without panicking.
        scheduler.schedule(&SplitMap::new().toggle("i1", "f2"));
        scheduler.close().await;
    }
}
