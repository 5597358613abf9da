// SPDX-License-Identifier: AGPL-3.0
// Civet Client - Receipt session
//
// One session owns all mutable state for one receipt on screen: the receipt
// data, the friend list, and the split map. The split map is derived from
// server data once at load; after that the local copy wins over anything
// the server reports (last local write wins).

use crate::api::ApiClient;
use crate::sync::SyncScheduler;
use civet_core::{receipt_shares, AppError, Friend, FriendShare, Receipt, SplitMap};
use std::sync::Arc;
use std::time::Duration;

/// The split assignment model for a single receipt
pub struct ReceiptSession {
    client: Arc<ApiClient>,
    receipt: Receipt,
    friends: Vec<Friend>,
    splits: SplitMap,
    scheduler: SyncScheduler,
}

impl ReceiptSession {
    /// Assemble a session from already-fetched parts. The split map is
    /// projected from the receipt's split rows.
    pub fn new(
        client: Arc<ApiClient>,
        receipt: Receipt,
        friends: Vec<Friend>,
        scheduler: SyncScheduler,
    ) -> Self {
        let splits = SplitMap::from_splits(&receipt.splits);
        Self {
            client,
            receipt,
            friends,
            splits,
            scheduler,
        }
    }

    /// Fetch a receipt and its friends and start a sync scheduler for it
    pub async fn load(
        client: Arc<ApiClient>,
        receipt_id: &str,
        debounce: Duration,
    ) -> Result<Self, AppError> {
        let receipt = client.receipt(receipt_id).await?;
        let friends = client.receipt_friends(receipt_id).await?;

        tracing::info!(
            "Loaded receipt {} ({} items, {} friends, {} splits)",
            receipt_id,
            receipt.items.len(),
            friends.len(),
            receipt.splits.len()
        );

        let scheduler = SyncScheduler::new(client.clone(), receipt_id.to_string(), debounce);
        Ok(Self::new(client, receipt, friends, scheduler))
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn friends(&self) -> &[Friend] {
        &self.friends
    }

    pub fn splits(&self) -> &SplitMap {
        &self.splits
    }

    /// Flip a friend's assignment on an item and schedule a debounced sync
    /// of the full state
    pub fn toggle(&mut self, item_id: &str, friend_id: &str) {
        self.splits = self.splits.toggle(item_id, friend_id);
        self.scheduler.schedule(&self.splits);
    }

    /// Per-friend shares under the current local split state
    pub fn totals(&self) -> Vec<FriendShare> {
        receipt_shares(&self.receipt, &self.friends, &self.splits)
    }

    /// Add a friend to the receipt, then refresh the friend list from the
    /// server. Duplicate names are allowed.
    pub async fn add_friend(&mut self, name: &str) -> Result<String, AppError> {
        let friend_id = self.client.add_friend(&self.receipt.id, name, None).await?;
        self.friends = self.client.receipt_friends(&self.receipt.id).await?;
        Ok(friend_id)
    }

    /// Re-fetch receipt data, e.g. after an upload. The split map is NOT
    /// rebuilt: the local projection stays authoritative after initial load.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.receipt = self.client.receipt(&self.receipt.id).await?;
        Ok(())
    }

    /// Flush any pending split sync and tear the session down
    pub async fn close(self) {
        self.scheduler.close().await;
    }
}
