// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashMap};

use crate::ledger::{StockRow, stock_rows, stock_value};
use crate::models::{Side, Status, Transaction, User};
use crate::permissions::require_signed_in;
use crate::store::Store;
use crate::utils::{currency_symbol, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

const RECENT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub transaction: Transaction,
    pub contact: Option<String>,
    pub due: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub mode: Side,
    pub total_transactions: usize,
    pub stock_value: Decimal,
    pub inventory: Vec<StockRow>,
    pub recent: Vec<Transaction>,
    pub reminders: Vec<Reminder>,
    pub amount_by_date: BTreeMap<NaiveDate, Decimal>,
    pub amount_by_product: BTreeMap<String, Decimal>,
}

/// Total count and stock value span both sides; the rest is limited to the
/// mode's transactions and catalog.
pub fn summarize(store: &Store, mode: Side) -> Summary {
    let balances = store.balances();
    let mut filtered: Vec<&Transaction> = store
        .transactions
        .iter()
        .filter(|t| t.direction == mode.direction())
        .collect();
    filtered.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let contacts: HashMap<&str, &str> = store
        .traders
        .iter()
        .map(|t| (t.name.as_str(), t.contact.as_str()))
        .collect();
    let reminders = filtered
        .iter()
        .filter(|t| t.status == Status::Booked && t.promise_date.is_some())
        .map(|t| Reminder {
            transaction: (*t).clone(),
            contact: contacts.get(t.name.as_str()).map(|c| c.to_string()),
            due: t.amount - t.paid_amount.unwrap_or(Decimal::ZERO),
        })
        .collect();

    let mut amount_by_date = BTreeMap::new();
    let mut amount_by_product = BTreeMap::new();
    for t in &filtered {
        *amount_by_date.entry(t.date).or_insert(Decimal::ZERO) += t.amount;
        *amount_by_product
            .entry(t.product.clone())
            .or_insert(Decimal::ZERO) += t.amount;
    }

    Summary {
        mode,
        total_transactions: store.transactions.len(),
        stock_value: stock_value(&balances, &store.catalog),
        inventory: stock_rows(&store.catalog, &balances, mode),
        recent: filtered.iter().take(RECENT).map(|t| (*t).clone()).collect(),
        reminders,
        amount_by_date,
        amount_by_product,
    }
}

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    require_signed_in(actor)?;
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let mode: Side = m.get_one::<String>("mode").unwrap().parse()?;
    let store = Store::load(conn)?;
    let s = summarize(&store, mode);
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;

    println!(
        "{}",
        pretty_table(
            &["Total Transactions", "Stock Value (Est)"],
            vec![vec![
                s.total_transactions.to_string(),
                fmt_money(&s.stock_value, &symbol),
            ]],
        )
    );

    if s.inventory.is_empty() {
        println!("No active stock items for this mode.");
    } else {
        let rows = s
            .inventory
            .iter()
            .map(|r| vec![r.product.to_uppercase(), r.size.clone(), r.qty.to_string()])
            .collect();
        println!("{}", pretty_table(&["Product", "Size", "Stock"], rows));
    }

    let rows = s
        .recent
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.name.clone(),
                format!("{} ({})", t.product, t.size),
                fmt_money(&t.amount, &symbol),
                t.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Name", "Item", "Amount", "Status"], rows)
    );

    if !s.reminders.is_empty() {
        let rows = s
            .reminders
            .iter()
            .map(|r| {
                vec![
                    r.transaction
                        .promise_date
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                    r.transaction.name.clone(),
                    r.contact.clone().unwrap_or_default(),
                    fmt_money(&r.due, &symbol),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Promised", "Name", "Contact", "Due"], rows)
        );
    }

    let rows = s
        .amount_by_product
        .iter()
        .map(|(p, a)| vec![p.clone(), fmt_money(a, &symbol)])
        .collect();
    println!("{}", pretty_table(&["Product", "Amount"], rows));
    Ok(())
}
