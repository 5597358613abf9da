// SPDX-License-Identifier: AGPL-3.0
// Civet Core - Type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person sharing a receipt. Created once per receipt, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: String,
    pub name: String,
}

/// A parsed line item on a receipt. Read-only on the client; the backend
/// extracts these from the uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: String,
    #[serde(default)]
    pub receipt_id: String,
    pub name: String,
    /// Unit price in dollars. The backend sends null for items it could not
    /// price; treated as zero.
    #[serde(default, deserialize_with = "null_to_zero")]
    pub price: f64,
    pub quantity: i64,
}

impl ReceiptItem {
    /// Extended price for the line (unit price times quantity)
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// A persisted (item, friend) assignment as the server reports it.
/// The client projects these into a [`crate::split::SplitMap`] at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub id: String,
    pub friend_id: String,
    pub order_item_id: String,
}

/// A surcharge line that is not an order item (service fee, delivery, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherFee {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub price: f64,
}

/// Full receipt as returned by `GET receipt/item/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
    pub restaurant: String,
    pub address: String,
    pub opened: DateTime<Utc>,
    pub order_number: String,
    pub order_type: String,
    pub payment_tip: Option<f64>,
    pub payment_amount_paid: Option<f64>,
    pub table_number: String,
    pub copy: String,
    pub server: String,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub sales_tax: f64,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub total: f64,
    pub image_url: String,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub fees: Vec<OtherFee>,
    #[serde(default)]
    pub splits: Vec<Split>,
}

impl Receipt {
    /// Sum of `price * quantity` over all items, before tax and fees
    pub fn item_subtotal(&self) -> f64 {
        self.items.iter().map(|i| i.line_total()).sum()
    }
}

/// An outing as returned by `GET outing`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outing {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub friends: Vec<Friend>,
    #[serde(default)]
    pub total_receipts: i64,
}

/// One row of `GET outing/{id}/receipts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub id: String,
    pub restaurant: String,
    pub order_count: i64,
    #[serde(default, deserialize_with = "null_to_zero")]
    pub total: f64,
}

/// Server-computed per-friend totals for a whole outing
/// (`GET outing/{id}/friends`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendTotals {
    pub name: String,
    pub subtotal: f64,
    pub tax_portion: f64,
    pub total_owed: f64,
}

/// Response of `POST receipt/upload`. `existing` means the image hash was
/// already ingested and no new receipt was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub hash: String,
    pub existing: bool,
}

fn null_to_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(0.0))
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_price_defaults_to_zero() {
        let item: ReceiptItem = serde_json::from_str(
            r#"{"id":"i1","receipt_id":"r1","name":"Soup","price":null,"quantity":2}"#,
        )
        .unwrap();
        assert_eq!(item.price, 0.0);
        assert_eq!(item.line_total(), 0.0);
    }

    #[test]
    fn test_line_total_uses_quantity() {
        let item: ReceiptItem = serde_json::from_str(
            r#"{"id":"i1","receipt_id":"r1","name":"Taco","price":3.5,"quantity":3}"#,
        )
        .unwrap();
        assert_eq!(item.line_total(), 10.5);
    }

    #[test]
    fn test_receipt_deserializes_wire_shape() {
        let receipt: Receipt = serde_json::from_str(
            r#"{
                "id": "r1",
                "restaurant": "Taqueria",
                "address": "1 Main St",
                "opened": "2024-05-01T19:30:00Z",
                "order_number": "42",
                "order_type": "dine-in",
                "payment_tip": null,
                "payment_amount_paid": null,
                "table_number": "7",
                "copy": "customer",
                "server": "Ana",
                "sales_tax": 1.25,
                "total": 21.25,
                "image_url": "https://example.com/r1.jpg",
                "items": [
                    {"id":"i1","receipt_id":"r1","name":"Taco","price":10.0,"quantity":2}
                ],
                "fees": [],
                "splits": [
                    {"id":"s1","friend_id":"f1","order_item_id":"i1"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(receipt.item_subtotal(), 20.0);
        assert_eq!(receipt.splits.len(), 1);
        assert!(receipt.payment_tip.is_none());
    }
}
