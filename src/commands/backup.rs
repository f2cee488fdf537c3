// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::UdhError;
use crate::models::{CatalogItem, Trader, Transaction, User};
use crate::permissions::{Capability, require};
use crate::store::{self, Store};
use crate::utils::record_activity;
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const BACKUP_VERSION: u32 = 1;

/// The whole dataset as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    #[serde(default)]
    pub exported_at: String,
    #[serde(default)]
    pub users: Vec<User>,
    pub transactions: Vec<Transaction>,
    pub traders: Vec<Trader>,
    pub catalog: Vec<CatalogItem>,
}

pub fn handle(conn: &mut Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => export(conn, actor, sub),
        Some(("restore", sub)) => restore(conn, actor, sub),
        _ => Ok(()),
    }
}

pub fn snapshot(conn: &Connection) -> Result<Backup> {
    let s = Store::load(conn)?;
    Ok(Backup {
        version: BACKUP_VERSION,
        exported_at: chrono::Utc::now().to_rfc3339(),
        users: store::load_users(conn)?,
        transactions: s.transactions,
        traders: s.traders,
        catalog: s.catalog,
    })
}

pub fn default_file_name() -> String {
    format!("UDH_Backup_{}.json", chrono::Local::now().date_naive())
}

fn export(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Backup)?;
    let out = sub
        .get_one::<String>("out")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(default_file_name);
    let data = snapshot(conn)?;
    std::fs::write(&out, serde_json::to_string_pretty(&data)?)
        .with_context(|| format!("Write backup to {}", out))?;
    record_activity(
        conn,
        actor,
        "backup.export",
        json!({ "out": out, "transactions": data.transactions.len() }),
    )?;
    println!("Exported backup to {}", out);
    Ok(())
}

/// Replace the dataset with `backup`, all or nothing. Users are only
/// replaced when the document carries some, so restoring a data-only file
/// never locks everybody out.
pub fn restore_from(conn: &mut Connection, backup: &Backup) -> Result<()> {
    if backup.version != BACKUP_VERSION {
        return Err(UdhError::Validation(format!(
            "Unsupported backup version {} (expected {})",
            backup.version, BACKUP_VERSION
        ))
        .into());
    }
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM transactions", [])?;
    tx.execute("DELETE FROM traders", [])?;
    tx.execute("DELETE FROM catalog", [])?;

    for t in &backup.transactions {
        tx.execute(
            "INSERT INTO transactions(id, date, name, type, product, size, qty, amount, status,
                                      payment_method, upi_id, paid_amount, promise_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                t.id,
                t.date.to_string(),
                t.name,
                t.direction.as_str(),
                t.product,
                t.size,
                t.qty,
                t.amount.to_string(),
                t.status.as_str(),
                t.payment_method,
                t.upi_id,
                t.paid_amount.map(|p| p.to_string()),
                t.promise_date.map(|d| d.to_string()),
            ],
        )
        .with_context(|| format!("Restore transaction #{}", t.id))?;
    }
    for t in &backup.traders {
        tx.execute(
            "INSERT INTO traders(id, name, contact, type) VALUES (?1, ?2, ?3, ?4)",
            params![t.id, t.name, t.contact, t.kind.as_str()],
        )
        .with_context(|| format!("Restore trader '{}'", t.name))?;
    }
    for c in &backup.catalog {
        tx.execute(
            "INSERT INTO catalog(id, type, product, size, price, stock_limit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                c.id,
                c.side.as_str(),
                c.product,
                c.size,
                c.price.to_string(),
                c.limit
            ],
        )
        .with_context(|| format!("Restore catalog item {} ({})", c.product, c.size))?;
    }
    if !backup.users.is_empty() {
        tx.execute("DELETE FROM users", [])?;
        for u in &backup.users {
            tx.execute(
                "INSERT INTO users(id, username, role, permissions) VALUES (?1, ?2, ?3, ?4)",
                params![
                    u.id,
                    u.username,
                    u.role.as_str(),
                    serde_json::to_string(&u.permissions)?
                ],
            )
            .with_context(|| format!("Restore user '{}'", u.username))?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn restore(conn: &mut Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Backup)?;
    let path = sub.get_one::<String>("path").unwrap().trim();
    let text = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
    let backup: Backup =
        serde_json::from_str(&text).with_context(|| format!("Parse backup {}", path))?;
    restore_from(conn, &backup)?;

    let mut store = Store::default();
    store.refresh(conn)?;
    record_activity(
        conn,
        actor,
        "backup.restore",
        json!({ "path": path, "transactions": store.transactions.len() }),
    )?;
    println!(
        "Restored {} transactions, {} traders, {} catalog items from {}",
        store.transactions.len(),
        store.traders.len(),
        store.catalog.len(),
        path
    );
    Ok(())
}
