// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::UdhError;
use crate::models::User;
use crate::store;

pub const DEFAULT_CURRENCY: &str = "₹";
pub const DEFAULT_LIMIT: i64 = 50;

/// Settings `config set` accepts.
pub const SETTING_KEYS: [&str; 2] = ["currency", "default_limit"];

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Quantities are whole units and at least one.
pub fn parse_qty(s: &str) -> Result<i64> {
    let q: i64 = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid quantity '{}', expected a whole number", s))?;
    if q < 1 {
        return Err(UdhError::Validation("Quantity must be at least 1.".into()).into());
    }
    Ok(q)
}

/// Trimmed value, or a validation error naming the field when blank.
pub fn required<'a>(value: Option<&'a String>, msg: &str) -> Result<&'a str> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UdhError::Validation(msg.to_string()).into())
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    format!("{}{:.2}", symbol, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Look up the acting user. No name means nobody is signed in.
pub fn resolve_actor(conn: &Connection, username: Option<&str>) -> Result<Option<User>> {
    let Some(name) = username.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match store::user_by_name(conn, name)? {
        Some(u) => Ok(Some(u)),
        None => Err(UdhError::UnknownUser(name.to_string()).into()),
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !SETTING_KEYS.contains(&key) {
        return Err(anyhow!(
            "Unknown setting '{}' (known: {})",
            key,
            SETTING_KEYS.join(", ")
        ));
    }
    if key == "default_limit" {
        value
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Invalid default_limit '{}'", value))?;
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value.trim()],
    )?;
    Ok(())
}

pub fn currency_symbol(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency")?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn default_limit(conn: &Connection) -> Result<i64> {
    match get_setting(conn, "default_limit")? {
        Some(v) => v
            .parse::<i64>()
            .with_context(|| format!("Invalid default_limit setting '{}'", v)),
        None => Ok(DEFAULT_LIMIT),
    }
}

/// Append to the activity log. Anonymous writes (bootstrap) log as `-`.
pub fn record_activity(
    conn: &Connection,
    actor: Option<&User>,
    action: &str,
    details: serde_json::Value,
) -> Result<()> {
    let (user, role) = match actor {
        Some(u) => (u.username.as_str(), u.role.as_str()),
        None => ("-", "-"),
    };
    conn.execute(
        "INSERT INTO activity(user, role, action, details) VALUES (?1, ?2, ?3, ?4)",
        params![user, role, action, details.to_string()],
    )?;
    tracing::info!(user, action, "recorded");
    Ok(())
}
