// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::UdhError;
use crate::models::{Direction, Side, Trader, TraderKind, Transaction, User};
use crate::permissions::{Capability, require, require_signed_in};
use crate::store::Store;
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, pretty_table, record_activity, required,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, actor, sub)?,
        Some(("list", sub)) => list(conn, actor, sub)?,
        Some(("edit", sub)) => edit(conn, actor, sub)?,
        Some(("rm", sub)) => remove(conn, actor, sub)?,
        Some(("show", sub)) => show(conn, actor, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Add)?;
    let name = required(sub.get_one::<String>("name"), "Name is required.")?;
    let contact = sub.get_one::<String>("contact").unwrap().trim();
    let kind: TraderKind = sub.get_one::<String>("type").unwrap().parse()?;
    conn.execute(
        "INSERT INTO traders(name, contact, type) VALUES (?1, ?2, ?3)",
        params![name, contact, kind.as_str()],
    )?;
    record_activity(
        conn,
        actor,
        "trader.add",
        json!({ "name": name, "contact": contact, "type": kind.as_str() }),
    )?;
    println!("Added {} '{}' ({})", kind, name, contact);
    Ok(())
}

fn list(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require_signed_in(actor)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mode: Option<Side> = sub
        .get_one::<String>("mode")
        .map(|m| m.parse())
        .transpose()?;
    let store = Store::load(conn)?;
    let data: Vec<Trader> = store
        .traders
        .iter()
        .filter(|t| mode.is_none_or(|m| t.kind == m.trader_kind()))
        .cloned()
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.name.clone(),
                    t.contact.clone(),
                    t.kind.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Name", "Contact", "Type"], rows));
    }
    Ok(())
}

fn edit(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Edit)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let store = Store::load(conn)?;
    let current = store
        .traders
        .iter()
        .find(|t| t.id == id)
        .ok_or(UdhError::NotFound { what: "Trader", id })?;
    let name = match sub.get_one::<String>("name") {
        Some(n) => required(Some(n), "Name is required.")?.to_string(),
        None => current.name.clone(),
    };
    let contact = sub
        .get_one::<String>("contact")
        .map(|c| c.trim().to_string())
        .unwrap_or_else(|| current.contact.clone());
    let kind: TraderKind = match sub.get_one::<String>("type") {
        Some(t) => t.parse()?,
        None => current.kind,
    };
    conn.execute(
        "UPDATE traders SET name=?1, contact=?2, type=?3 WHERE id=?4",
        params![name, contact, kind.as_str(), id],
    )?;
    record_activity(conn, actor, "trader.edit", json!({ "id": id, "name": name }))?;
    println!("Updated {} '{}'", kind, name);
    Ok(())
}

fn remove(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Delete)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute("DELETE FROM traders WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(UdhError::NotFound { what: "Trader", id }.into());
    }
    record_activity(conn, actor, "trader.delete", json!({ "id": id }))?;
    println!("Removed trader #{}", id);
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct Portal {
    pub name: String,
    pub contact: Option<String>,
    pub total: usize,
    pub purchases: usize,
    /// Sales count positive, purchases negative.
    pub net_amount: Decimal,
    pub history: Vec<Transaction>,
}

/// Everything on record for one counterparty. History matches the name
/// exactly, since transactions carry the name as free text.
pub fn portal(store: &Store, name: &str) -> Portal {
    let history: Vec<Transaction> = store
        .transactions
        .iter()
        .filter(|t| t.name == name)
        .cloned()
        .collect();
    let purchases = history
        .iter()
        .filter(|t| t.direction == Direction::Buy)
        .count();
    let net_amount = history
        .iter()
        .map(|t| match t.direction {
            Direction::Sell => t.amount,
            Direction::Buy => -t.amount,
        })
        .sum();
    Portal {
        name: name.to_string(),
        contact: store
            .traders
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.contact.clone()),
        total: history.len(),
        purchases,
        net_amount,
        history,
    }
}

fn show(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require_signed_in(actor)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let name = sub.get_one::<String>("name").unwrap().trim();
    let store = Store::load(conn)?;
    let p = portal(&store, name);
    if maybe_print_json(json_flag, jsonl_flag, &p)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    println!(
        "{} ({})",
        p.name,
        p.contact.as_deref().unwrap_or("no contact on file")
    );
    println!(
        "{}",
        pretty_table(
            &["Transactions", "Purchases", "Net Amount"],
            vec![vec![
                p.total.to_string(),
                p.purchases.to_string(),
                fmt_money(&p.net_amount, &symbol),
            ]],
        )
    );
    let rows = p
        .history
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.direction.to_string(),
                format!("{} ({})", t.product, t.size),
                t.qty.to_string(),
                fmt_money(&t.amount, &symbol),
                t.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Type", "Item", "Qty", "Amount", "Status"], rows)
    );
    Ok(())
}
