// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stock balances derived from the transaction history.
//!
//! Nothing here is stored: balances are a fold over the complete list of
//! transactions, recomputed on every read. A `buy` adds its quantity, a
//! `sell` removes it. `returned` transactions keep the effect of their
//! direction; whether a return should reverse it is an open product
//! question, so it is deliberately left alone here.
//!
//! Negative balances are valid (the item is oversold) and only flagged
//! when displayed.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CatalogItem, Direction, Side, Transaction};

pub type Balances = BTreeMap<String, i64>;

pub fn stock_key(product: &str, size: &str) -> String {
    format!("{}-{}", product, size)
}

/// Quantity with the sign of its effect on stock.
pub fn signed_qty(tx: &Transaction) -> i64 {
    match tx.direction {
        Direction::Buy => tx.qty,
        Direction::Sell => -tx.qty,
    }
}

pub fn derive_balances(transactions: &[Transaction]) -> Balances {
    let mut map = Balances::new();
    for tx in transactions {
        *map.entry(stock_key(&tx.product, &tx.size)).or_insert(0) += signed_qty(tx);
    }
    map
}

pub fn stock_for(balances: &Balances, product: &str, size: &str) -> i64 {
    balances
        .get(&stock_key(product, size))
        .copied()
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerLine {
    pub transaction: Transaction,
    pub delta: i64,
    pub running: i64,
}

/// History of one product/size, oldest first, with the balance after each
/// entry. Same-day entries keep their input order.
pub fn running_balance(transactions: &[Transaction], product: &str, size: &str) -> Vec<LedgerLine> {
    let mut history: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.product == product && t.size == size)
        .collect();
    // stable: ties keep input order
    history.sort_by_key(|t| t.date);

    let mut running = 0i64;
    history
        .into_iter()
        .map(|t| {
            let delta = signed_qty(t);
            running += delta;
            LedgerLine {
                transaction: t.clone(),
                delta,
                running,
            }
        })
        .collect()
}

pub fn is_low_stock(item: &CatalogItem, qty: i64) -> bool {
    item.limit.is_some_and(|limit| qty < limit)
}

/// Estimated value of the stock on hand: price × quantity for every key with
/// a positive balance. Prices come from the catalog by product/size; when
/// both sides list the same key the later entry wins.
pub fn stock_value(balances: &Balances, catalog: &[CatalogItem]) -> Decimal {
    let prices: HashMap<String, Decimal> = catalog
        .iter()
        .map(|c| (stock_key(&c.product, &c.size), c.price))
        .collect();
    balances
        .iter()
        .filter(|(_, qty)| **qty > 0)
        .map(|(key, qty)| prices.get(key).copied().unwrap_or(Decimal::ZERO) * Decimal::from(*qty))
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRow {
    pub id: i64,
    pub product: String,
    pub size: String,
    pub price: Decimal,
    pub limit: Option<i64>,
    pub qty: i64,
    pub low: bool,
    pub oversold: bool,
}

/// Catalog entries of one side joined with their current balance.
pub fn stock_rows(catalog: &[CatalogItem], balances: &Balances, side: Side) -> Vec<StockRow> {
    catalog
        .iter()
        .filter(|c| c.side == side)
        .map(|c| {
            let qty = stock_for(balances, &c.product, &c.size);
            StockRow {
                id: c.id,
                product: c.product.clone(),
                size: c.size.clone(),
                price: c.price,
                limit: c.limit,
                qty,
                low: is_low_stock(c, qty),
                oversold: qty < 0,
            }
        })
        .collect()
}
