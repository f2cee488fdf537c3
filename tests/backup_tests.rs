// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;
use udh::commands::backup::{self, Backup, BACKUP_VERSION, restore_from, snapshot};
use udh::error::UdhError;
use udh::models::User;
use udh::permissions::{Capability, PermissionSet, Role};
use udh::store::{Store, load_users};
use udh::{cli, db};

fn seeded() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO users(username, role, permissions) VALUES ('owner','Owner','{\"backup\":true}');
         INSERT INTO traders(name, contact, type) VALUES ('Kiran','90000','Customer');
         INSERT INTO catalog(type, product, size, price, stock_limit) VALUES ('sales','Cement','50kg','400.50',10);
         INSERT INTO transactions(date,name,type,product,size,qty,amount,status,paid_amount,promise_date)
             VALUES ('2025-03-01','Kiran','sell','Cement','50kg',2,'801','booked','300','2025-03-20');",
    )
    .unwrap();
    conn
}

fn empty() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn snapshot_uses_camel_case_field_names() {
    let conn = seeded();
    let data = snapshot(&conn).unwrap();
    assert_eq!(data.version, BACKUP_VERSION);
    let v = serde_json::to_value(&data).unwrap();
    assert!(v.get("exportedAt").is_some());
    let t = &v["transactions"][0];
    assert_eq!(t["type"], "sell");
    assert_eq!(t["status"], "booked");
    assert_eq!(t["promiseDate"], "2025-03-20");
    assert!(t.get("upiId").is_none());
    assert_eq!(v["catalog"][0]["type"], "sales");
    assert_eq!(v["traders"][0]["type"], "Customer");
    assert_eq!(v["users"][0]["role"], "Owner");
    assert_eq!(v["users"][0]["permissions"]["backup"], true);
}

#[test]
fn restore_replaces_everything_and_keeps_ids() {
    let src = seeded();
    let data = snapshot(&src).unwrap();

    let mut dst = empty();
    dst.execute(
        "INSERT INTO catalog(type, product, size, price) VALUES ('buy','Steel','8mm','70')",
        [],
    )
    .unwrap();
    restore_from(&mut dst, &data).unwrap();

    let store = Store::load(&dst).unwrap();
    assert_eq!(store.catalog.len(), 1);
    assert_eq!(store.catalog[0].product, "Cement");
    assert_eq!(store.catalog[0].price, "400.50".parse::<Decimal>().unwrap());
    assert_eq!(store.catalog[0].limit, Some(10));
    let t = &store.transactions[0];
    assert_eq!(t.id, data.transactions[0].id);
    assert_eq!(t.paid_amount, Some(Decimal::from(300)));
    assert_eq!(store.traders[0].name, "Kiran");
    assert_eq!(load_users(&dst).unwrap()[0].username, "owner");
}

#[test]
fn restore_without_users_keeps_existing_accounts() {
    let mut conn = seeded();
    let doc: Backup = serde_json::from_str(
        r#"{"version":1,"traders":[],"catalog":[],
            "transactions":[{"id":5,"date":"2025-01-02","name":"Ravi","type":"buy",
             "product":"Sand","size":"1t","qty":3,"amount":"900","status":"purchased"}]}"#,
    )
    .unwrap();
    restore_from(&mut conn, &doc).unwrap();

    let store = Store::load(&conn).unwrap();
    assert_eq!(store.transactions.len(), 1);
    assert_eq!(store.transactions[0].id, 5);
    assert!(store.traders.is_empty());
    assert!(store.catalog.is_empty());
    assert_eq!(load_users(&conn).unwrap().len(), 1);
}

#[test]
fn unrelated_json_is_not_a_backup() {
    assert!(serde_json::from_str::<Backup>(r#"{"hello":"world"}"#).is_err());
    assert!(serde_json::from_str::<Backup>(r#"{"version":1,"transactions":[]}"#).is_err());
}

#[test]
fn restore_rejects_foreign_files_and_other_versions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"hello":"world"}"#).unwrap();
    let path = path.to_str().unwrap();
    let owner = User {
        id: 1,
        username: "owner".into(),
        role: Role::Owner,
        permissions: PermissionSet::from_caps(&[Capability::Backup]),
    };

    let mut conn = seeded();
    let m = cli::build_cli().get_matches_from(["udh", "backup", "restore", "--path", path]);
    assert!(backup::handle(&mut conn, Some(&owner), m.subcommand().unwrap().1).is_err());

    let mut future = snapshot(&conn).unwrap();
    future.version = BACKUP_VERSION + 1;
    future.transactions.clear();
    let err = restore_from(&mut conn, &future).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::Validation(_))));

    let store = Store::load(&conn).unwrap();
    assert_eq!(store.transactions.len(), 1);
    assert_eq!(store.traders.len(), 1);
    assert_eq!(store.catalog.len(), 1);
}

#[test]
fn failed_restore_leaves_data_untouched() {
    let mut conn = seeded();
    let mut doc = snapshot(&conn).unwrap();
    let dup = doc.catalog[0].clone();
    doc.catalog.push(dup);
    assert!(restore_from(&mut conn, &doc).is_err());

    let store = Store::load(&conn).unwrap();
    assert_eq!(store.catalog.len(), 1);
    assert_eq!(store.transactions.len(), 1);
}

#[test]
fn export_then_restore_through_the_command_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("backup.json");
    let path = path.to_str().unwrap();
    let owner = User {
        id: 1,
        username: "owner".into(),
        role: Role::Owner,
        permissions: PermissionSet::from_caps(&[Capability::Backup]),
    };

    let mut src = seeded();
    let m = cli::build_cli().get_matches_from(["udh", "backup", "export", "--out", path]);
    backup::handle(&mut src, Some(&owner), m.subcommand().unwrap().1).unwrap();

    let mut dst = empty();
    let m = cli::build_cli().get_matches_from(["udh", "backup", "restore", "--path", path]);
    backup::handle(&mut dst, Some(&owner), m.subcommand().unwrap().1).unwrap();
    assert_eq!(Store::load(&dst).unwrap().transactions.len(), 1);

    let staff = User {
        permissions: PermissionSet::default(),
        role: Role::Staff,
        ..owner
    };
    let err = backup::handle(&mut dst, Some(&staff), m.subcommand().unwrap().1).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UdhError>(),
        Some(UdhError::PermissionDenied { capability: Capability::Backup, .. })
    ));
}

#[test]
fn default_backup_name_carries_the_date() {
    let name = backup::default_file_name();
    assert!(name.starts_with("UDH_Backup_"));
    assert!(name.ends_with(".json"));
}
