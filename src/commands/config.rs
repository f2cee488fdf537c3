// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::User;
use crate::permissions::{require_signed_in, require_superuser};
use crate::utils::{
    SETTING_KEYS, currency_symbol, default_limit, get_setting, pretty_table, record_activity,
    set_setting,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            require_signed_in(actor)?;
            get(conn, sub)?
        }
        Some(("set", sub)) => {
            require_superuser(actor)?;
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(conn, key, value)?;
            record_activity(conn, actor, "config.set", json!({ "key": key, "value": value }))?;
            println!("{} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}

fn get(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let effective = |key: &str| -> Result<String> {
        match key {
            "currency" => currency_symbol(conn),
            "default_limit" => Ok(default_limit(conn)?.to_string()),
            other => get_setting(conn, other)?.ok_or_else(|| anyhow!("Unknown setting '{}'", other)),
        }
    };
    match sub.get_one::<String>("key") {
        Some(key) => println!("{}", effective(key.trim())?),
        None => {
            let mut rows = Vec::new();
            for key in SETTING_KEYS {
                rows.push(vec![key.to_string(), effective(key)?]);
            }
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
    }
    Ok(())
}
