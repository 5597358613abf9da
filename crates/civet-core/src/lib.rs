// SPDX-License-Identifier: AGPL-3.0
// Civet Core - Shared domain logic for all frontends
//
// This crate provides:
// - The wire types for the Civet API (receipts, outings, friends, splits)
// - SplitMap, the local item-to-friend assignment state
// - Per-friend share aggregation
// - AppConfig and the token cache
//
// Network and frontend code lives in separate crates.

pub mod aggregate;
pub mod config;
pub mod split;
pub mod token;
pub mod types;

// Re-export commonly used items
pub use aggregate::{friend_shares, receipt_shares, round_cents, FriendShare};
pub use config::{AppConfig, DEFAULT_DEBOUNCE_MS};
pub use split::{SplitItem, SplitMap};
pub use token::{FileTokenCache, StaticToken, TokenProvider};
pub use types::{
    AppError, Friend, FriendTotals, OtherFee, Outing, Receipt, ReceiptItem, ReceiptSummary, Split,
    UploadOutcome,
};
