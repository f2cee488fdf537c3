// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use udh::{cli, commands, db, utils};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_override = matches.get_one::<String>("db").map(PathBuf::from);
    let mut conn = db::open_or_init(db_override.as_deref())?;
    let actor = utils::resolve_actor(&conn, matches.get_one::<String>("as").map(|s| s.as_str()))?;
    let actor = actor.as_ref();

    match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {}",
                db::db_path(db_override.as_deref())?.display()
            );
        }
        Some(("tx", sub)) => commands::transactions::handle(&conn, actor, sub)?,
        Some(("catalog", sub)) => commands::catalog::handle(&conn, actor, sub)?,
        Some(("trader", sub)) => commands::traders::handle(&conn, actor, sub)?,
        Some(("stock", sub)) => commands::stock::handle(&conn, actor, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, actor, sub)?,
        Some(("backup", sub)) => commands::backup::handle(&mut conn, actor, sub)?,
        Some(("user", sub)) => commands::users::handle(&conn, actor, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&conn, actor, sub)?,
        Some(("activity", sub)) => commands::activity::handle(&conn, actor, sub)?,
        Some(("config", sub)) => commands::config::handle(&conn, actor, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn, actor)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
