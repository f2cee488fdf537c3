// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::UdhError;
use crate::models::User;
use crate::permissions::{Access, Capability, PermissionSet, Role, require, require_superuser};
use crate::store::{load_users, user_by_name};
use crate::utils::{maybe_print_json, pretty_table, record_activity, required};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde_json::json;

pub fn handle(conn: &Connection, actor: Option<&User>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, actor, sub)?,
        Some(("list", sub)) => list(conn, actor, sub)?,
        Some(("edit", sub)) => edit(conn, actor, sub)?,
        Some(("rm", sub)) => remove(conn, actor, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_caps(values: Option<clap::parser::ValuesRef<'_, String>>) -> Result<Vec<Capability>> {
    values
        .into_iter()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse())
        .collect()
}

fn user_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
}

/// Only the Technical Team may hand out Technical Team membership.
fn guard_role(actor: Option<&User>, role: Role) -> Result<()> {
    if role == Role::TechnicalTeam {
        require_superuser(actor)?;
    }
    Ok(())
}

fn add(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    let bootstrap = user_count(conn)? == 0;
    let role: Role = sub.get_one::<String>("role").unwrap().parse()?;
    if !bootstrap {
        require(actor, Capability::AddNew)?;
        guard_role(actor, role)?;
    }
    let username = required(sub.get_one::<String>("username"), "Username is required.")?;
    let perms = PermissionSet::from_caps(&parse_caps(sub.get_many::<String>("perm"))?);
    let candidate = User {
        id: 0,
        username: username.to_string(),
        role,
        permissions: perms,
    };
    // The first account has to be able to create the rest.
    if bootstrap && !Access::for_user(&candidate).allows(Capability::AddNew) {
        return Err(UdhError::Validation(
            "The first user must be in the Technical Team or hold the addNew permission.".into(),
        )
        .into());
    }
    conn.execute(
        "INSERT INTO users(username, role, permissions) VALUES (?1, ?2, ?3)",
        params![username, role.as_str(), serde_json::to_string(&perms)?],
    )?;
    record_activity(
        conn,
        actor,
        "user.add",
        json!({ "username": username, "role": role.as_str(), "bootstrap": bootstrap }),
    )?;
    println!("Added user '{}' ({})", username, role);
    Ok(())
}

fn list(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::AddNew)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let users = load_users(conn)?;
    if !maybe_print_json(json_flag, jsonl_flag, &users)? {
        let rows = users
            .iter()
            .map(|u| {
                let perms = if u.role == Role::TechnicalTeam {
                    "(all)".to_string()
                } else {
                    u.permissions.granted().join(", ")
                };
                vec![u.username.clone(), u.role.to_string(), perms]
            })
            .collect();
        println!("{}", pretty_table(&["Username", "Role", "Permissions"], rows));
    }
    Ok(())
}

fn edit(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::AddNew)?;
    let username = sub.get_one::<String>("username").unwrap().trim();
    let mut user =
        user_by_name(conn, username)?.ok_or_else(|| UdhError::UnknownUser(username.to_string()))?;
    if user.role == Role::TechnicalTeam {
        require_superuser(actor)?;
    }
    if let Some(r) = sub.get_one::<String>("role") {
        let role: Role = r.parse()?;
        guard_role(actor, role)?;
        user.role = role;
    }
    for cap in parse_caps(sub.get_many::<String>("grant"))? {
        user.permissions.set(cap, true);
    }
    for cap in parse_caps(sub.get_many::<String>("revoke"))? {
        user.permissions.set(cap, false);
    }
    conn.execute(
        "UPDATE users SET role=?1, permissions=?2 WHERE id=?3",
        params![
            user.role.as_str(),
            serde_json::to_string(&user.permissions)?,
            user.id
        ],
    )?;
    record_activity(
        conn,
        actor,
        "user.edit",
        json!({ "username": user.username, "role": user.role.as_str(), "permissions": user.permissions }),
    )?;
    println!(
        "Updated '{}' ({}): {}",
        user.username,
        user.role,
        user.permissions.granted().join(", ")
    );
    Ok(())
}

fn remove(conn: &Connection, actor: Option<&User>, sub: &clap::ArgMatches) -> Result<()> {
    require(actor, Capability::AddNew)?;
    let username = sub.get_one::<String>("username").unwrap().trim();
    if actor.is_some_and(|a| a.username == username) {
        return Err(UdhError::Validation("You cannot remove your own account.".into()).into());
    }
    let user =
        user_by_name(conn, username)?.ok_or_else(|| UdhError::UnknownUser(username.to_string()))?;
    if user.role == Role::TechnicalTeam {
        require_superuser(actor)?;
    }
    conn.execute("DELETE FROM users WHERE id=?1", params![user.id])?;
    record_activity(conn, actor, "user.delete", json!({ "username": username }))?;
    println!("Removed user '{}'", username);
    Ok(())
}
