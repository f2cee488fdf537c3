// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use crate::ledger::stock_key;
use crate::models::{Status, User};
use crate::permissions::require_signed_in;
use crate::store::Store;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Problems worth a look, as (issue, detail) pairs.
pub fn findings(store: &Store, today: NaiveDate) -> Vec<(String, String)> {
    let mut rows = Vec::new();

    // 1) Oversold items
    for (key, qty) in store.balances() {
        if qty < 0 {
            rows.push(("oversold".to_string(), format!("{} ({})", key, qty)));
        }
    }

    // 2) Transactions against products the catalog does not list
    let listed: HashSet<String> = store
        .catalog
        .iter()
        .map(|c| stock_key(&c.product, &c.size))
        .collect();
    let mut reported = HashSet::new();
    for t in &store.transactions {
        let key = stock_key(&t.product, &t.size);
        if !listed.contains(&key) && reported.insert(key.clone()) {
            rows.push(("not_in_catalog".to_string(), key));
        }
    }

    // 3) Booked payments past their promise date
    for t in &store.transactions {
        if t.status != Status::Booked {
            continue;
        }
        if let Some(d) = t.promise_date.filter(|d| *d < today) {
            rows.push((
                "overdue_promise".to_string(),
                format!("#{} {} promised {}", t.id, t.name, d),
            ));
        }
    }
    rows
}

pub fn handle(conn: &Connection, actor: Option<&User>) -> Result<()> {
    require_signed_in(actor)?;
    let store = Store::load(conn)?;
    let rows: Vec<Vec<String>> = findings(&store, chrono::Local::now().date_naive())
        .into_iter()
        .map(|(issue, detail)| vec![issue, detail])
        .collect();

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
