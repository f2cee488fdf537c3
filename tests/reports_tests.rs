// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use tempfile::tempdir;
use udh::commands::reports::{self, customer_rows, sales_rows, stock_report_rows, write_csv};
use udh::error::UdhError;
use udh::models::{Side, User};
use udh::permissions::{Capability, PermissionSet, Role};
use udh::store::Store;
use udh::{cli, db};

fn seeded() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO traders(name, contact, type) VALUES ('Kiran','90000','Customer');
         INSERT INTO traders(name, contact, type) VALUES ('Ravi Traders','98450','Dealer');
         INSERT INTO catalog(type, product, size, price) VALUES ('sales','Cement','50kg','400');
         INSERT INTO catalog(type, product, size, price) VALUES ('buy','Cement','50kg','350');
         INSERT INTO transactions(date,name,type,product,size,qty,amount,status)
             VALUES ('2025-03-01','Ravi Traders','buy','Cement','50kg',100,'35000','purchased');
         INSERT INTO transactions(date,name,type,product,size,qty,amount,status)
             VALUES ('2025-03-02','Kiran','sell','Cement','50kg',30,'12000','purchased');",
    )
    .unwrap();
    conn
}

#[test]
fn sales_report_lists_one_side_under_the_header() {
    let store = Store::load(&seeded()).unwrap();
    let rows = sales_rows(&store, Side::Sales);
    assert_eq!(
        rows[0],
        vec!["Date", "Type", "Customer", "Product", "Size", "Qty", "Amount", "Status"]
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[1],
        vec!["2025-03-02", "sell", "Kiran", "Cement", "50kg", "30", "12000", "purchased"]
    );
    assert_eq!(sales_rows(&store, Side::Buy)[1][2], "Ravi Traders");
}

#[test]
fn stock_report_counts_both_directions() {
    let store = Store::load(&seeded()).unwrap();
    let rows = stock_report_rows(&store, Side::Sales);
    assert_eq!(rows[0], vec!["Product", "Size", "Current Stock"]);
    assert_eq!(rows[1], vec!["Cement", "50kg", "70"]);
}

#[test]
fn customer_report_includes_dealers() {
    let store = Store::load(&seeded()).unwrap();
    let rows = customer_rows(&store);
    assert_eq!(rows[0], vec!["Name", "Contact", "Type"]);
    assert_eq!(rows.len(), 3);
    assert!(rows.contains(&vec!["Ravi Traders".to_string(), "98450".into(), "Dealer".into()]));
}

#[test]
fn csv_file_quotes_embedded_commas() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let path = path.to_str().unwrap();
    write_csv(
        path,
        &[
            vec!["Name".into(), "Contact".into()],
            vec!["Sharma, Sons".into(), "123".into()],
        ],
    )
    .unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text, "Name,Contact\n\"Sharma, Sons\",123\n");
}

#[test]
fn report_command_needs_reports_permission() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("sales.csv");
    let out = out.to_str().unwrap();
    let m = cli::build_cli().get_matches_from(["udh", "report", "sales", "--out", out]);
    let report_m = m.subcommand().unwrap().1;

    let worker = User {
        id: 3,
        username: "raju".into(),
        role: Role::Worker,
        permissions: PermissionSet::default(),
    };
    let err = reports::handle(&conn, Some(&worker), report_m).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UdhError>(),
        Some(UdhError::PermissionDenied { capability: Capability::Reports, .. })
    ));
    assert!(!dir.path().join("sales.csv").exists());

    let owner = User {
        permissions: PermissionSet::from_caps(&[Capability::Reports]),
        ..worker
    };
    reports::handle(&conn, Some(&owner), report_m).unwrap();
    let mut rdr = csv::Reader::from_path(out).unwrap();
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][2], "Kiran");

    let logged: String = conn
        .query_row("SELECT action FROM activity ORDER BY id DESC LIMIT 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(logged, "report.sales");
}
