// SPDX-License-Identifier: AGPL-3.0
// Civet Core - Per-friend totals
//
// Each item's cost is split evenly among the friends assigned to it. Tax is
// apportioned by each friend's share of the full item subtotal, so a receipt
// with unassigned items distributes less than the full tax (those items
// belong to nobody yet).

use crate::split::SplitMap;
use crate::types::{Friend, Receipt, ReceiptItem};
use serde::{Deserialize, Serialize};

/// What one friend owes for a receipt, rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendShare {
    pub friend_id: String,
    pub name: String,
    pub subtotal: f64,
    pub tax_portion: f64,
    pub total_owed: f64,
}

/// Round a dollar amount to whole cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Compute each friend's share of a receipt under the current split map.
///
/// Returns one entry per friend in input order, including friends who owe
/// nothing.
pub fn friend_shares(
    items: &[ReceiptItem],
    friends: &[Friend],
    splits: &SplitMap,
    sales_tax: f64,
) -> Vec<FriendShare> {
    let item_subtotal: f64 = items.iter().map(ReceiptItem::line_total).sum();

    friends
        .iter()
        .map(|friend| {
            let subtotal: f64 = items
                .iter()
                .filter(|item| splits.contains(&item.id, &friend.id))
                .map(|item| item.line_total() / splits.assignee_count(&item.id) as f64)
                .sum();

            let tax_portion = if item_subtotal > 0.0 {
                (subtotal / item_subtotal) * sales_tax
            } else {
                0.0
            };

            FriendShare {
                friend_id: friend.id.clone(),
                name: friend.name.clone(),
                subtotal: round_cents(subtotal),
                tax_portion: round_cents(tax_portion),
                total_owed: round_cents(subtotal + tax_portion),
            }
        })
        .collect()
}

/// Convenience wrapper taking the receipt aggregate
pub fn receipt_shares(receipt: &Receipt, friends: &[Friend], splits: &SplitMap) -> Vec<FriendShare> {
    friend_shares(&receipt.items, friends, splits, receipt.sales_tax)
}
