// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::stock_rows;
use crate::models::{Side, User};
use crate::permissions::{Capability, require};
use crate::store::Store;
use crate::utils::record_activity;
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    require(actor, Capability::Reports)?;
    let store = Store::load(conn)?;
    let (rows, default_name) = match name {
        "sales" => {
            let side: Side = sub.get_one::<String>("mode").unwrap().parse()?;
            (sales_rows(&store, side), "Sales_Report.csv")
        }
        "stock" => {
            let side: Side = sub.get_one::<String>("mode").unwrap().parse()?;
            (stock_report_rows(&store, side), "Inventory_Report.csv")
        }
        "customers" => (customer_rows(&store), "Customers.csv"),
        _ => return Ok(()),
    };
    let out = sub
        .get_one::<String>("out")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| default_name.to_string());
    write_csv(&out, &rows)?;
    record_activity(
        conn,
        actor,
        &format!("report.{}", name),
        json!({ "out": out, "rows": rows.len() - 1 }),
    )?;
    println!("Wrote {} rows to {}", rows.len() - 1, out);
    Ok(())
}

/// Transactions of one side, header first.
pub fn sales_rows(store: &Store, side: Side) -> Vec<Vec<String>> {
    let mut rows = vec![
        ["Date", "Type", "Customer", "Product", "Size", "Qty", "Amount", "Status"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    ];
    for t in store
        .transactions
        .iter()
        .filter(|t| t.direction == side.direction())
    {
        rows.push(vec![
            t.date.to_string(),
            t.direction.to_string(),
            t.name.clone(),
            t.product.clone(),
            t.size.clone(),
            t.qty.to_string(),
            t.amount.to_string(),
            t.status.to_string(),
        ]);
    }
    rows
}

/// Current balance of every catalog entry on one side. Balances span the
/// whole history regardless of side.
pub fn stock_report_rows(store: &Store, side: Side) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Product".to_string(),
        "Size".to_string(),
        "Current Stock".to_string(),
    ]];
    for r in stock_rows(&store.catalog, &store.balances(), side) {
        rows.push(vec![r.product, r.size, r.qty.to_string()]);
    }
    rows
}

pub fn customer_rows(store: &Store) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Name".to_string(),
        "Contact".to_string(),
        "Type".to_string(),
    ]];
    for t in &store.traders {
        rows.push(vec![t.name.clone(), t.contact.clone(), t.kind.to_string()]);
    }
    rows
}

pub fn write_csv(path: &str, rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("Create {}", path))?;
    for r in rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    Ok(())
}
