// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use udh::commands::stock::{self, ledger_rows, list_rows};
use udh::error::UdhError;
use udh::ledger::{running_balance, stock_rows};
use udh::models::{Side, User};
use udh::permissions::{Capability, PermissionSet, Role};
use udh::store::Store;
use udh::{cli, db};

fn seeded() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO catalog(type, product, size, price, stock_limit) VALUES ('sales','Cement','50kg','400',80);
         INSERT INTO catalog(type, product, size, price) VALUES ('sales','Steel','8mm','70');
         INSERT INTO catalog(type, product, size, price, stock_limit) VALUES ('sales','Sand','1t','900',5);
         INSERT INTO transactions(date,name,type,product,size,qty,amount,status)
             VALUES ('2025-03-01','Ravi Traders','buy','Cement','50kg',100,'35000','purchased');
         INSERT INTO transactions(date,name,type,product,size,qty,amount,status)
             VALUES ('2025-03-02','Kiran','sell','Cement','50kg',30,'12000','purchased');
         INSERT INTO transactions(date,name,type,product,size,qty,amount,status)
             VALUES ('2025-03-02','Kiran','sell','Steel','8mm',5,'350','purchased');
         INSERT INTO transactions(date,name,type,product,size,qty,amount,status)
             VALUES ('2025-03-03','Ravi Traders','buy','Sand','1t',10,'8000','purchased');",
    )
    .unwrap();
    conn
}

fn user(role: Role, caps: &[Capability]) -> User {
    User {
        id: 4,
        username: "meena".into(),
        role,
        permissions: PermissionSet::from_caps(caps),
    }
}

fn stock_matches(args: &[&str]) -> clap::ArgMatches {
    let argv = ["udh", "stock"].into_iter().chain(args.iter().copied());
    let m = cli::build_cli().get_matches_from(argv);
    m.subcommand().unwrap().1.clone()
}

#[test]
fn stock_views_need_reports_or_limits() {
    let conn = seeded();
    let list = stock_matches(&["list", "--json"]);
    let ledger = stock_matches(&["ledger", "--product", "Cement", "--size", "50kg", "--json"]);

    let err = stock::handle(&conn, None, &list).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::NotSignedIn)));

    let clerk = user(Role::Staff, &[Capability::Add, Capability::Print]);
    let err = stock::handle(&conn, Some(&clerk), &ledger).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UdhError>(),
        Some(UdhError::PermissionDenied { capability: Capability::Reports, .. })
    ));

    stock::handle(&conn, Some(&user(Role::Staff, &[Capability::Reports])), &list).unwrap();
    stock::handle(&conn, Some(&user(Role::Worker, &[Capability::Limits])), &ledger).unwrap();
    stock::handle(&conn, Some(&user(Role::TechnicalTeam, &[])), &list).unwrap();
    stock::handle(&conn, Some(&user(Role::Owner, &[Capability::Limits])), &stock_matches(&["list"]))
        .unwrap();
}

#[test]
fn stock_list_flags_oversold_and_low_items() {
    let store = Store::load(&seeded()).unwrap();
    let rows = list_rows(&stock_rows(&store.catalog, &store.balances(), Side::Sales), "₹");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["Cement", "50kg", "70", "80", "₹400.00", "Low stock"]);
    assert_eq!(rows[1], vec!["Steel", "8mm", "-5", "", "₹70.00", "OVERSOLD"]);
    assert_eq!(rows[2], vec!["Sand", "1t", "10", "5", "₹900.00", ""]);
}

#[test]
fn stock_ledger_shows_signed_moves_and_running_total() {
    let store = Store::load(&seeded()).unwrap();
    let rows = ledger_rows(&running_balance(&store.transactions, "Cement", "50kg"));
    assert_eq!(
        rows,
        vec![
            vec!["2025-03-01", "buy", "Ravi Traders", "+100", "100"],
            vec!["2025-03-02", "sell", "Kiran", "-30", "70"],
        ]
    );
}
