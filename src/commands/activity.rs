// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{ActivityEntry, User};
use crate::permissions::require_superuser;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        list(conn, actor, sub)?;
    }
    Ok(())
}

/// Newest first.
pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<ActivityEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, user, role, action, details, timestamp FROM activity
         ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, user, role, action, details, timestamp) = row?;
        out.push(ActivityEntry {
            id,
            user,
            role,
            action,
            details: serde_json::from_str(&details).unwrap_or(serde_json::Value::String(details)),
            timestamp,
        });
    }
    Ok(out)
}

fn list(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require_superuser(actor)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let limit = *sub.get_one::<usize>("limit").unwrap();
    let data = recent(conn, limit)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|e| {
                vec![
                    e.timestamp.clone(),
                    e.user.clone(),
                    e.role.clone(),
                    e.action.clone(),
                    e.details.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Time", "User", "Role", "Action", "Details"], rows)
        );
    }
    Ok(())
}
