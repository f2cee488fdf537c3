// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-side snapshot of the database.
//!
//! Handlers never read tables piecemeal for ledger work: they load a
//! [`Store`], compute over it, and after writing call [`Store::refresh`],
//! which swaps the whole snapshot for a fresh one.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::ledger::{self, Balances};
use crate::models::{CatalogItem, Trader, Transaction, User};
use crate::permissions::PermissionSet;

#[derive(Debug, Clone, Default)]
pub struct Store {
    pub transactions: Vec<Transaction>,
    pub traders: Vec<Trader>,
    pub catalog: Vec<CatalogItem>,
}

impl Store {
    pub fn load(conn: &Connection) -> Result<Self> {
        let store = Store {
            transactions: load_transactions(conn)?,
            traders: load_traders(conn)?,
            catalog: load_catalog(conn)?,
        };
        tracing::debug!(
            transactions = store.transactions.len(),
            traders = store.traders.len(),
            catalog = store.catalog.len(),
            "snapshot loaded"
        );
        Ok(store)
    }

    pub fn refresh(&mut self, conn: &Connection) -> Result<()> {
        *self = Store::load(conn)?;
        Ok(())
    }

    pub fn balances(&self) -> Balances {
        ledger::derive_balances(&self.transactions)
    }

    pub fn transaction(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn trader_named(&self, name: &str) -> Option<&Trader> {
        self.traders
            .iter()
            .find(|t| t.name.to_lowercase() == name.to_lowercase())
    }
}

fn parse_amount(s: &str, what: &str, id: i64) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' on record #{}", what, s, id))
}

fn parse_day(s: &str, id: i64) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' on record #{}", s, id))
}

type RawTransaction = (
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, name, type, product, size, qty, amount, status,
                payment_method, upi_id, paid_amount, promise_date
         FROM transactions ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| -> rusqlite::Result<RawTransaction> {
        Ok((
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
            r.get(8)?,
            r.get(9)?,
            r.get(10)?,
            r.get(11)?,
            r.get(12)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, date, name, typ, product, size, qty, amount, status, method, upi, paid, promise) =
            row?;
        out.push(Transaction {
            id,
            date: parse_day(&date, id)?,
            name,
            direction: typ.parse()?,
            product,
            size,
            qty,
            amount: parse_amount(&amount, "amount", id)?,
            status: status.parse()?,
            payment_method: method,
            upi_id: upi,
            paid_amount: paid
                .map(|p| parse_amount(&p, "paid amount", id))
                .transpose()?,
            promise_date: promise
                .filter(|p| !p.is_empty())
                .map(|p| parse_day(&p, id))
                .transpose()?,
        });
    }
    Ok(out)
}

pub fn load_traders(conn: &Connection) -> Result<Vec<Trader>> {
    let mut stmt = conn.prepare("SELECT id, name, contact, type FROM traders ORDER BY name, id")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, contact, kind) = row?;
        out.push(Trader {
            id,
            name,
            contact,
            kind: kind.parse()?,
        });
    }
    Ok(out)
}

pub fn load_catalog(conn: &Connection) -> Result<Vec<CatalogItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, type, product, size, price, stock_limit FROM catalog ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<i64>>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, side, product, size, price, limit) = row?;
        out.push(CatalogItem {
            id,
            side: side.parse()?,
            product,
            size,
            price: parse_amount(&price, "price", id)?,
            limit,
        });
    }
    Ok(out)
}

pub fn load_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, username, role, permissions FROM users ORDER BY username")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, username, role, perms) = row?;
        out.push(user_from_row(id, username, &role, &perms)?);
    }
    Ok(out)
}

pub fn user_by_name(conn: &Connection, username: &str) -> Result<Option<User>> {
    let mut stmt = conn.prepare("SELECT id, username, role, permissions FROM users WHERE username=?1")?;
    let mut rows = stmt.query(params![username])?;
    match rows.next()? {
        Some(r) => {
            let id: i64 = r.get(0)?;
            let name: String = r.get(1)?;
            let role: String = r.get(2)?;
            let perms: String = r.get(3)?;
            Ok(Some(user_from_row(id, name, &role, &perms)?))
        }
        None => Ok(None),
    }
}

fn user_from_row(id: i64, username: String, role: &str, perms: &str) -> Result<User> {
    let permissions: PermissionSet = serde_json::from_str(perms)
        .with_context(|| format!("Invalid permission set for user '{}'", username))?;
    Ok(User {
        id,
        role: role.parse()?,
        username,
        permissions,
    })
}
