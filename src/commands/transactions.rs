// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::UdhError;
use crate::ledger::stock_key;
use crate::models::{CatalogItem, Direction, Side, Status, Transaction, User};
use crate::permissions::{Capability, require, require_signed_in};
use crate::store::Store;
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, parse_date, parse_decimal, parse_qty,
    pretty_table, record_activity, required,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde_json::json;

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, actor, sub)?,
        Some(("list", sub)) => list(conn, actor, sub)?,
        Some(("edit", sub)) => edit(conn, actor, sub)?,
        Some(("rm", sub)) => remove(conn, actor, sub)?,
        Some(("print", sub)) => print(conn, actor, sub)?,
        _ => {}
    }
    Ok(())
}

/// Build a transaction from command-line fields laid over `base` (the
/// stored record when editing). Applies the entry rules: required fields,
/// positive quantity, catalog-priced amount when none is given, and a fully
/// paid amount for `purchased`.
pub fn draft(
    sub: &clap::ArgMatches,
    base: Option<&Transaction>,
    catalog: &[CatalogItem],
) -> Result<Transaction> {
    let arg = |k: &str| sub.get_one::<String>(k);

    let date = match (arg("date"), base) {
        (Some(d), _) => parse_date(d)?,
        (None, Some(b)) => b.date,
        (None, None) => chrono::Local::now().date_naive(),
    };
    let direction: Direction = match (arg("type"), base) {
        (Some(t), _) => t.parse()?,
        (None, Some(b)) => b.direction,
        (None, None) => Direction::Sell,
    };
    let name = required(
        arg("name").or(base.map(|b| &b.name)),
        "Customer/Dealer name is required.",
    )?
    .to_string();
    let product = required(
        arg("product").or(base.map(|b| &b.product)),
        "Please select a product.",
    )?
    .to_string();
    let size = required(arg("size").or(base.map(|b| &b.size)), "Please select a size.")?.to_string();
    let qty = match (arg("qty"), base) {
        (Some(q), _) => parse_qty(q)?,
        (None, Some(b)) => b.qty,
        (None, None) => return Err(UdhError::Validation("Quantity must be at least 1.".into()).into()),
    };
    let status: Status = match (arg("status"), base) {
        (Some(s), _) => s.parse()?,
        (None, Some(b)) => b.status,
        (None, None) => Status::Purchased,
    };

    let repriced = ["type", "product", "size", "qty"]
        .iter()
        .any(|k| arg(k).is_some());
    let amount = match (arg("amount"), base) {
        (Some(a), _) => parse_decimal(a)?,
        (None, Some(b)) if !repriced => b.amount,
        _ => match catalog_price(catalog, direction.side(), &product, &size) {
            Some(price) => price * Decimal::from(qty),
            None => base.map(|b| b.amount).unwrap_or_else(|| {
                tracing::warn!(key = %stock_key(&product, &size), "no catalog price, amount set to 0");
                Decimal::ZERO
            }),
        },
    };

    let mut paid_amount = match (arg("paid"), base) {
        (Some(p), _) => Some(parse_decimal(p)?),
        // A full payment no longer holds once the entry leaves `purchased`.
        (None, Some(b)) if b.status == Status::Purchased && status != Status::Purchased => None,
        (None, Some(b)) => b.paid_amount,
        (None, None) => None,
    };
    if status == Status::Purchased {
        paid_amount = Some(amount);
    }
    let promise_date = match (arg("promise"), base) {
        (Some(p), _) if p.trim().is_empty() => None,
        (Some(p), _) => Some(parse_date(p)?),
        (None, Some(b)) => b.promise_date,
        (None, None) => None,
    };
    let payment_method = arg("method")
        .cloned()
        .or_else(|| base.and_then(|b| b.payment_method.clone()))
        .or_else(|| Some("Cash".to_string()));
    let upi_id = arg("upi")
        .cloned()
        .or_else(|| base.and_then(|b| b.upi_id.clone()));

    Ok(Transaction {
        id: base.map(|b| b.id).unwrap_or(0),
        date,
        name,
        direction,
        product,
        size,
        qty,
        amount,
        status,
        payment_method,
        upi_id,
        paid_amount,
        promise_date,
    })
}

fn catalog_price(catalog: &[CatalogItem], side: Side, product: &str, size: &str) -> Option<Decimal> {
    catalog
        .iter()
        .find(|c| c.side == side && c.product == product && c.size == size)
        .map(|c| c.price)
}

/// Make sure the counterparty exists in the directory, creating it from
/// `contact` when it does not.
fn ensure_trader(
    conn: &Connection,
    store: &Store,
    actor: Option<&User>,
    tx: &Transaction,
    contact: Option<&String>,
) -> Result<()> {
    if store.trader_named(&tx.name).is_some() {
        return Ok(());
    }
    let contact = required(contact, "Contact number is required for new customers.")?;
    let kind = tx.direction.trader_kind();
    conn.execute(
        "INSERT INTO traders(name, contact, type) VALUES (?1, ?2, ?3)",
        params![tx.name, contact, kind.as_str()],
    )?;
    record_activity(
        conn,
        actor,
        "trader.add",
        json!({ "name": tx.name, "contact": contact, "type": kind.as_str() }),
    )?;
    println!("Added {} '{}' ({})", kind, tx.name, contact);
    Ok(())
}

fn add(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Add)?;
    let store = Store::load(conn)?;
    let tx = draft(sub, None, &store.catalog)?;
    ensure_trader(conn, &store, actor, &tx, sub.get_one::<String>("contact"))?;

    conn.execute(
        "INSERT INTO transactions(date, name, type, product, size, qty, amount, status,
                                  payment_method, upi_id, paid_amount, promise_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            tx.date.to_string(),
            tx.name,
            tx.direction.as_str(),
            tx.product,
            tx.size,
            tx.qty,
            tx.amount.to_string(),
            tx.status.as_str(),
            tx.payment_method,
            tx.upi_id,
            tx.paid_amount.map(|p| p.to_string()),
            tx.promise_date.map(|d| d.to_string()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    record_activity(
        conn,
        actor,
        "transaction.add",
        json!({ "id": id, "type": tx.direction, "product": tx.product, "size": tx.size, "qty": tx.qty }),
    )?;
    println!(
        "Recorded #{}: {} {} x {} ({}) for '{}' on {}",
        id, tx.direction, tx.qty, tx.product, tx.size, tx.name, tx.date
    );
    Ok(())
}

fn edit(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Edit)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let store = Store::load(conn)?;
    let existing = store
        .transaction(id)
        .ok_or(UdhError::NotFound { what: "Transaction", id })?;
    let tx = draft(sub, Some(existing), &store.catalog)?;
    ensure_trader(conn, &store, actor, &tx, sub.get_one::<String>("contact"))?;

    conn.execute(
        "UPDATE transactions SET date=?1, name=?2, type=?3, product=?4, size=?5, qty=?6,
                amount=?7, status=?8, payment_method=?9, upi_id=?10, paid_amount=?11,
                promise_date=?12
         WHERE id=?13",
        params![
            tx.date.to_string(),
            tx.name,
            tx.direction.as_str(),
            tx.product,
            tx.size,
            tx.qty,
            tx.amount.to_string(),
            tx.status.as_str(),
            tx.payment_method,
            tx.upi_id,
            tx.paid_amount.map(|p| p.to_string()),
            tx.promise_date.map(|d| d.to_string()),
            id,
        ],
    )?;
    record_activity(conn, actor, "transaction.edit", json!({ "id": id }))?;
    println!("Updated transaction #{}", id);
    Ok(())
}

fn remove(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Delete)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(UdhError::NotFound { what: "Transaction", id }.into());
    }
    record_activity(conn, actor, "transaction.delete", json!({ "id": id }))?;
    println!("Removed transaction #{}", id);
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct TxFilter {
    pub mode: Option<Side>,
    pub date: Option<chrono::NaiveDate>,
    pub name: Option<String>,
    pub product: Option<String>,
    pub size: Option<String>,
    pub status: Option<Status>,
    pub limit: Option<usize>,
}

impl TxFilter {
    pub fn from_matches(sub: &clap::ArgMatches) -> Result<Self> {
        Ok(TxFilter {
            mode: sub
                .get_one::<String>("mode")
                .map(|m| m.parse())
                .transpose()?,
            date: sub
                .get_one::<String>("date")
                .map(|d| parse_date(d))
                .transpose()?,
            name: sub.get_one::<String>("name").cloned(),
            product: sub.get_one::<String>("product").cloned(),
            size: sub.get_one::<String>("size").cloned(),
            status: sub
                .get_one::<String>("status")
                .map(|s| s.parse())
                .transpose()?,
            limit: sub.get_one::<usize>("limit").copied(),
        })
    }

    fn matches(&self, t: &Transaction) -> bool {
        let contains = |hay: &str, needle: &Option<String>| {
            needle
                .as_ref()
                .is_none_or(|n| hay.to_lowercase().contains(&n.to_lowercase()))
        };
        self.mode.is_none_or(|m| t.direction == m.direction())
            && self.date.is_none_or(|d| t.date == d)
            && contains(&t.name, &self.name)
            && self.product.as_ref().is_none_or(|p| &t.product == p)
            && contains(&t.size, &self.size)
            && self.status.is_none_or(|s| t.status == s)
    }
}

/// Newest first, then capped at the filter's limit.
pub fn query_rows(transactions: &[Transaction], filter: &TxFilter) -> Vec<Transaction> {
    let mut rows: Vec<Transaction> = transactions
        .iter()
        .filter(|t| filter.matches(t))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    if let Some(limit) = filter.limit {
        rows.truncate(limit);
    }
    rows
}

fn list(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require_signed_in(actor)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let store = Store::load(conn)?;
    let data = query_rows(&store.transactions, &TxFilter::from_matches(sub)?);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let symbol = currency_symbol(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.direction.to_string(),
                    t.name.clone(),
                    t.product.clone(),
                    t.size.clone(),
                    t.qty.to_string(),
                    fmt_money(&t.amount, &symbol),
                    t.status.to_string(),
                    t.promise_date.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Name", "Product", "Size", "Qty", "Amount", "Status", "Promise"],
                rows,
            )
        );
    }
    Ok(())
}

/// Receipt numbers show the last six digits of the id.
pub fn receipt_no(id: i64) -> String {
    let s = format!("{:06}", id);
    s[s.len() - 6..].to_string()
}

pub fn render_bill(tx: &Transaction, symbol: &str, format: &str) -> String {
    let mut out = String::new();
    if format == "invoice" {
        let rate = if tx.qty > 0 {
            tx.amount / Decimal::from(tx.qty)
        } else {
            Decimal::ZERO
        };
        out.push_str(&format!("INVOICE #{}\n", receipt_no(tx.id)));
        out.push_str(&format!("Date: {}\n", tx.date));
        out.push_str(&format!("Bill to: {}\n\n", tx.name));
        out.push_str(
            &pretty_table(
                &["Item", "Rate", "Qty", "Amount"],
                vec![vec![
                    format!("{} ({})", tx.product, tx.size),
                    format!("{:.2}", rate.round_dp(2)),
                    tx.qty.to_string(),
                    fmt_money(&tx.amount, symbol),
                ]],
            )
            .to_string(),
        );
        out.push_str(&format!("\nTotal: {}\n", fmt_money(&tx.amount, symbol)));
    } else {
        out.push_str(&format!("Receipt #: {}\n", receipt_no(tx.id)));
        out.push_str(&format!("Date: {}\n", tx.date));
        out.push_str(&format!("Customer: {}\n", tx.name));
        out.push_str(&format!("Product: {} ({})\n", tx.product, tx.size));
        out.push_str(&format!("Qty: {}\n", tx.qty));
        out.push_str(&format!("Amount: {}\n", fmt_money(&tx.amount, symbol)));
    }
    if tx.status == Status::Booked {
        let paid = tx.paid_amount.unwrap_or(Decimal::ZERO);
        out.push_str(&format!("Paid: {}\n", fmt_money(&paid, symbol)));
        out.push_str(&format!("Due: {}\n", fmt_money(&(tx.amount - paid), symbol)));
        if let Some(d) = tx.promise_date {
            out.push_str(&format!("Promised by: {}\n", d));
        }
    }
    out
}

fn print(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::Print)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let format = sub.get_one::<String>("format").unwrap();
    let store = Store::load(conn)?;
    let tx = store
        .transaction(id)
        .ok_or(UdhError::NotFound { what: "Transaction", id })?;
    print!("{}", render_bill(tx, &currency_symbol(conn)?, format));
    Ok(())
}
