// SPDX-License-Identifier: AGPL-3.0
// Civet CLI - Command implementations

use anyhow::{bail, Context, Result};
use civet_client::{ApiClient, ReceiptSession};
use civet_core::{AppConfig, FileTokenCache, TokenProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn api_client() -> Result<Arc<ApiClient>> {
    let config = AppConfig::from_env().context("reading configuration")?;
    let token = Arc::new(FileTokenCache::new().context("opening token cache")?);
    let client = ApiClient::new(&config, token).context("creating API client")?;
    Ok(Arc::new(client))
}

fn debounce() -> Result<Duration> {
    let config = AppConfig::from_env().context("reading configuration")?;
    Ok(Duration::from_millis(config.debounce_ms))
}

pub fn auth_set_token(token: String) -> Result<()> {
    let cache = FileTokenCache::new().context("opening token cache")?;
    cache.set(token).context("storing token")?;
    println!("Token stored.");
    Ok(())
}

pub fn auth_clear() -> Result<()> {
    let cache = FileTokenCache::new().context("opening token cache")?;
    cache.clear().context("clearing token")?;
    println!("Token cleared.");
    Ok(())
}

pub fn auth_show() -> Result<()> {
    let cache = FileTokenCache::new().context("opening token cache")?;
    match cache.token() {
        Some(_) => println!("A token is cached."),
        None => println!("No token cached."),
    }
    Ok(())
}

pub async fn outings_list() -> Result<()> {
    let client = api_client()?;
    let outings = client.list_outings().await?;

    if outings.is_empty() {
        println!("No outings yet.");
        return Ok(());
    }

    for outing in outings {
        println!(
            "{}  {}  [{}]  {} receipts, {} friends",
            outing.id,
            outing.name,
            outing.status,
            outing.total_receipts,
            outing.friends.len()
        );
    }
    Ok(())
}

pub async fn outings_create(name: &str) -> Result<()> {
    let client = api_client()?;
    let id = client.create_outing(name).await?;
    println!("Created outing {}", id);
    Ok(())
}

pub async fn receipts_list(outing_id: &str) -> Result<()> {
    let client = api_client()?;
    let receipts = client.outing_receipts(outing_id).await?;

    if receipts.is_empty() {
        println!("No receipts yet. Upload one with `civet upload`.");
        return Ok(());
    }

    for receipt in receipts {
        println!(
            "{}  {}  {} items  ${:.2}",
            receipt.id, receipt.restaurant, receipt.order_count, receipt.total
        );
    }
    Ok(())
}

pub async fn receipt_show(receipt_id: &str) -> Result<()> {
    let client = api_client()?;
    let session = ReceiptSession::load(client, receipt_id, debounce()?).await?;
    print_receipt(&session);
    session.close().await;
    Ok(())
}

fn print_receipt(session: &ReceiptSession) {
    let receipt = session.receipt();

    println!("{} - {}", receipt.restaurant, receipt.address);
    println!("Order #{} ({})\n", receipt.order_number, receipt.order_type);

    for item in &receipt.items {
        let assigned: Vec<&str> = session.splits().assigned(&item.id).collect();
        println!(
            "  {}  {} x{}  ${:.2}  [{}]",
            item.id,
            item.name,
            item.quantity,
            item.line_total(),
            assigned.join(", ")
        );
    }

    for fee in &receipt.fees {
        println!("  {}  ${:.2}", fee.name, fee.price);
    }

    println!("\n  Tax    ${:.2}", receipt.sales_tax);
    println!("  Total  ${:.2}", receipt.total);

    let totals = session.totals();
    if !totals.is_empty() {
        println!();
        for share in totals {
            println!(
                "  {}  subtotal ${:.2}  tax ${:.2}  owes ${:.2}",
                share.name, share.subtotal, share.tax_portion, share.total_owed
            );
        }
    }
}

pub async fn friends_list(receipt_id: &str) -> Result<()> {
    let client = api_client()?;
    let friends = client.receipt_friends(receipt_id).await?;

    if friends.is_empty() {
        println!("No friends added yet. Add friends to split the bill with.");
        return Ok(());
    }

    for friend in friends {
        println!("{}  {}", friend.id, friend.name);
    }
    Ok(())
}

pub async fn friends_add(receipt_id: &str, name: &str) -> Result<()> {
    let client = api_client()?;
    let friend_id = client.add_friend(receipt_id, name, None).await?;
    println!("Added {} ({})", name, friend_id);
    Ok(())
}

pub async fn split_toggle(receipt_id: &str, pairs: &[String]) -> Result<()> {
    let client = api_client()?;
    let mut session = ReceiptSession::load(client, receipt_id, debounce()?).await?;

    for pair in pairs {
        let Some((item_id, friend_id)) = pair.split_once(':') else {
            bail!("invalid pair {:?}, expected item_id:friend_id", pair);
        };
        session.toggle(item_id, friend_id);
    }

    for share in session.totals() {
        println!(
            "{}  subtotal ${:.2}  tax ${:.2}  owes ${:.2}",
            share.name, share.subtotal, share.tax_portion, share.total_owed
        );
    }

    // Waits for the debounced submission to flush.
    session.close().await;
    Ok(())
}

pub async fn outing_totals(outing_id: &str) -> Result<()> {
    let client = api_client()?;
    let totals = client.outing_friend_totals(outing_id).await?;

    if totals.is_empty() {
        println!("No friends added yet.");
        return Ok(());
    }

    for friend in totals {
        println!(
            "{}  subtotal ${:.2}  tax ${:.2}  owes ${:.2}",
            friend.name, friend.subtotal, friend.tax_portion, friend.total_owed
        );
    }
    Ok(())
}

pub async fn upload(outing_id: &str, path: &Path) -> Result<()> {
    let client = api_client()?;
    let outcome = client.upload_receipt(outing_id, path, None).await?;

    if outcome.existing {
        println!("Already uploaded (hash {}).", outcome.hash);
    } else {
        println!("Uploaded and parsed (hash {}).", outcome.hash);
    }
    Ok(())
}
