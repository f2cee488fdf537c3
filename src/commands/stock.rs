// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{LedgerLine, StockRow, running_balance, stock_rows};
use crate::models::{Side, User};
use crate::permissions::{Capability, require_any};
use crate::store::Store;
use crate::utils::{currency_symbol, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    require_any(actor, &[Capability::Reports, Capability::Limits])?;
    match name {
        "list" => list(conn, sub)?,
        "ledger" => ledger(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn flag(row: &StockRow) -> &'static str {
    if row.oversold {
        "OVERSOLD"
    } else if row.low {
        "Low stock"
    } else {
        ""
    }
}

pub fn list_rows(data: &[StockRow], symbol: &str) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| {
            vec![
                r.product.clone(),
                r.size.clone(),
                r.qty.to_string(),
                r.limit.map(|l| l.to_string()).unwrap_or_default(),
                fmt_money(&r.price, symbol),
                flag(r).to_string(),
            ]
        })
        .collect()
}

pub fn ledger_rows(lines: &[LedgerLine]) -> Vec<Vec<String>> {
    lines
        .iter()
        .map(|l| {
            vec![
                l.transaction.date.to_string(),
                l.transaction.direction.to_string(),
                l.transaction.name.clone(),
                format!("{:+}", l.delta),
                l.running.to_string(),
            ]
        })
        .collect()
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let side: Side = sub.get_one::<String>("mode").unwrap().parse()?;
    let store = Store::load(conn)?;
    let data = stock_rows(&store.catalog, &store.balances(), side);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if data.is_empty() {
            println!("No stock items yet.");
            return Ok(());
        }
        let rows = list_rows(&data, &currency_symbol(conn)?);
        println!(
            "{}",
            pretty_table(&["Product", "Size", "Stock", "Limit", "Price", ""], rows)
        );
    }
    Ok(())
}

fn ledger(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let product = sub.get_one::<String>("product").unwrap().trim();
    let size = sub.get_one::<String>("size").unwrap().trim();
    let store = Store::load(conn)?;
    let lines = running_balance(&store.transactions, product, size);
    if !maybe_print_json(json_flag, jsonl_flag, &lines)? {
        println!("{} ({})", product, size);
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Name", "Qty", "Running Stock"],
                ledger_rows(&lines)
            )
        );
    }
    Ok(())
}
