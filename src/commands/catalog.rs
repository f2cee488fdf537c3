// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::UdhError;
use crate::ledger::{stock_rows, stock_for};
use crate::models::{Side, User};
use crate::permissions::{Capability, require, require_signed_in};
use crate::store::Store;
use crate::utils::{
    currency_symbol, default_limit, fmt_money, maybe_print_json, parse_decimal, pretty_table,
    record_activity, required,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde_json::json;

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, actor, sub)?,
        Some(("list", sub)) => list(conn, actor, sub)?,
        Some(("limit", sub)) => set_limit(conn, actor, sub)?,
        Some(("price", sub)) => set_price(conn, actor, sub)?,
        Some(("rm", sub)) => remove(conn, actor, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Limits)?;
    let side: Side = sub.get_one::<String>("mode").unwrap().parse()?;
    let product = required(sub.get_one::<String>("product"), "Product is required.")?;
    let size = required(sub.get_one::<String>("size"), "Size is required.")?;
    let price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
    let limit = sub.get_one::<i64>("limit").copied();

    conn.execute(
        "INSERT INTO catalog(type, product, size, price, stock_limit) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![side.as_str(), product, size, price.to_string(), limit],
    )
    .with_context(|| format!("Could not add {} ({}) to the {} catalog", product, size, side))?;
    record_activity(
        conn,
        actor,
        "catalog.add",
        json!({ "type": side, "product": product, "size": size, "price": price.to_string() }),
    )?;
    println!("Added {} ({}) to the {} catalog at {}", product, size, side, price);
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
    let items: Vec<_> = store
        .catalog
        .iter()
        .filter(|c| mode.is_none_or(|m| c.side == m))
        .cloned()
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let balances = store.balances();
        let symbol = currency_symbol(conn)?;
        let rows = items
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.side.to_string(),
                    c.product.clone(),
                    c.size.clone(),
                    fmt_money(&c.price, &symbol),
                    c.limit.map(|l| l.to_string()).unwrap_or_default(),
                    stock_for(&balances, &c.product, &c.size).to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Side", "Product", "Size", "Price", "Limit", "Stock"], rows)
        );
    }
    Ok(())
}

fn set_limit(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Limits)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let value = match sub.get_one::<i64>("value") {
        Some(v) => *v,
        None => default_limit(conn)?,
    };
    let n = conn.execute(
        "UPDATE catalog SET stock_limit=?1 WHERE id=?2",
        params![value, id],
    )?;
    if n == 0 {
        return Err(UdhError::NotFound { what: "Catalog item", id }.into());
    }
    record_activity(conn, actor, "catalog.limit", json!({ "id": id, "limit": value }))?;

    let store = Store::load(conn)?;
    let balances = store.balances();
    if let Some(row) = stock_rows(&store.catalog, &balances, Side::Sales)
        .into_iter()
        .chain(stock_rows(&store.catalog, &balances, Side::Buy))
        .find(|r| r.id == id)
    {
        println!(
            "Limit for {} ({}) set to {} (stock {}{})",
            row.product,
            row.size,
            value,
            row.qty,
            if row.low { ", low" } else { "" }
        );
    }
    Ok(())
}

fn set_price(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Limits)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
    let n = conn.execute(
        "UPDATE catalog SET price=?1 WHERE id=?2",
        params![price.to_string(), id],
    )?;
    if n == 0 {
        return Err(UdhError::NotFound { what: "Catalog item", id }.into());
    }
    record_activity(
        conn,
        actor,
        "catalog.price",
        json!({ "id": id, "price": price.to_string() }),
    )?;
    println!("Price for catalog item #{} set to {}", id, price);
    Ok(())
}

fn remove(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Limits)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute("DELETE FROM catalog WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(UdhError::NotFound { what: "Catalog item", id }.into());
    }
    record_activity(conn, actor, "catalog.delete", json!({ "id": id }))?;
    println!("Removed catalog item #{}", id);
    Ok(())
}
