// SPDX-License-Identifier: AGPL-3.0
// Civet Client - HTTP client and split sync for the Civet backend
//
// This crate provides:
// - ApiClient for all Civet REST endpoints, including receipt image upload
// - SyncScheduler, the debounced write-through for split assignments
// - ReceiptSession, the single owner of one receipt's on-screen state
//
// Domain types live in civet-core; frontends live in separate crates.

pub mod api;
pub mod session;
pub mod sync;
pub mod upload;

// Re-export commonly used items
pub use api::ApiClient;
pub use session::ReceiptSession;
pub use sync::{SplitSink, SplitSyncRequest, SyncScheduler};
