// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use udh::commands::{activity, config, users};
use udh::error::UdhError;
use udh::models::User;
use udh::permissions::{Capability, Role};
use udh::store::{load_users, user_by_name};
use udh::utils::{currency_symbol, default_limit, resolve_actor};
use udh::{cli, db};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let argv = std::iter::once("udh").chain(args.iter().copied());
    let m = cli::build_cli().get_matches_from(argv);
    m.subcommand().unwrap().1.clone()
}

fn user(conn: &Connection, actor: Option<&User>, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["user"];
    full.extend_from_slice(args);
    users::handle(conn, actor, &sub_matches(&full))
}

fn lookup(conn: &Connection, name: &str) -> User {
    user_by_name(conn, name).unwrap().unwrap()
}

#[test]
fn first_user_bootstraps_without_sign_in() {
    let conn = setup();
    user(&conn, None, &["add", "--username", "admin", "--role", "Technical Team"]).unwrap();
    let admin = lookup(&conn, "admin");
    assert_eq!(admin.role, Role::TechnicalTeam);

    // Once someone exists, anonymous adds are refused.
    let err = user(&conn, None, &["add", "--username", "ghost"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::NotSignedIn)));

    let logged: String = conn
        .query_row("SELECT user FROM activity WHERE action='user.add'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(logged, "-");
}

#[test]
fn owner_can_add_staff_but_not_technical_team() {
    let conn = setup();
    user(&conn, None, &["add", "--username", "admin", "--role", "tech"]).unwrap();
    let admin = lookup(&conn, "admin");
    user(
        &conn,
        Some(&admin),
        &["add", "--username", "owner", "--role", "Owner", "--perm", "addNew,reports"],
    )
    .unwrap();
    let owner = lookup(&conn, "owner");
    assert!(owner.permissions.get(Capability::AddNew));
    assert!(owner.permissions.get(Capability::Reports));
    assert!(!owner.permissions.get(Capability::Delete));

    user(
        &conn,
        Some(&owner),
        &["add", "--username", "meena", "--perm", "add", "--perm", "print"],
    )
    .unwrap();
    let meena = lookup(&conn, "meena");
    assert_eq!(meena.role, Role::Staff);
    assert_eq!(meena.permissions.granted(), vec!["add", "print"]);

    let err = user(
        &conn,
        Some(&owner),
        &["add", "--username", "sneaky", "--role", "Technical Team"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UdhError>(),
        Some(UdhError::Restricted { .. })
    ));

    let err = user(&conn, Some(&meena), &["add", "--username", "friend"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UdhError>(),
        Some(UdhError::PermissionDenied { capability: Capability::AddNew, .. })
    ));
    assert_eq!(load_users(&conn).unwrap().len(), 3);
}

#[test]
fn edit_grants_and_revokes_and_protects_superusers() {
    let conn = setup();
    user(&conn, None, &["add", "--username", "admin", "--role", "Technical Team"]).unwrap();
    let admin = lookup(&conn, "admin");
    user(&conn, Some(&admin), &["add", "--username", "owner", "--role", "owner", "--perm", "addNew"]).unwrap();
    user(&conn, Some(&admin), &["add", "--username", "meena", "--perm", "add,edit"]).unwrap();
    let owner = lookup(&conn, "owner");

    user(
        &conn,
        Some(&owner),
        &["edit", "--username", "meena", "--grant", "delete", "--revoke", "edit"],
    )
    .unwrap();
    let meena = lookup(&conn, "meena");
    assert!(meena.permissions.get(Capability::Delete));
    assert!(!meena.permissions.get(Capability::Edit));
    assert!(meena.permissions.get(Capability::Add));

    let err = user(&conn, Some(&owner), &["edit", "--username", "admin", "--revoke", "add"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::Restricted { .. })));

    let err = user(&conn, Some(&owner), &["edit", "--username", "nobody"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::UnknownUser(_))));
}

#[test]
fn remove_refuses_self_and_superusers_for_non_superusers() {
    let conn = setup();
    user(&conn, None, &["add", "--username", "admin", "--role", "Technical Team"]).unwrap();
    let admin = lookup(&conn, "admin");
    user(&conn, Some(&admin), &["add", "--username", "owner", "--role", "Owner", "--perm", "addNew"]).unwrap();
    user(&conn, Some(&admin), &["add", "--username", "meena"]).unwrap();
    let owner = lookup(&conn, "owner");

    let err = user(&conn, Some(&owner), &["rm", "--username", "owner"]).unwrap_err();
    assert!(err.to_string().contains("your own account"));
    assert!(user(&conn, Some(&owner), &["rm", "--username", "admin"]).is_err());

    user(&conn, Some(&owner), &["rm", "--username", "meena"]).unwrap();
    assert!(user_by_name(&conn, "meena").unwrap().is_none());
    assert!(user_by_name(&conn, "admin").unwrap().is_some());
}

#[test]
fn resolve_actor_reports_unknown_names() {
    let conn = setup();
    assert!(resolve_actor(&conn, None).unwrap().is_none());
    assert!(resolve_actor(&conn, Some("  ")).unwrap().is_none());
    let err = resolve_actor(&conn, Some("ghost")).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::UnknownUser(n)) if n == "ghost"));
}

#[test]
fn activity_log_is_technical_team_only_and_newest_first() {
    let conn = setup();
    user(&conn, None, &["add", "--username", "admin", "--role", "Technical Team"]).unwrap();
    let admin = lookup(&conn, "admin");
    user(&conn, Some(&admin), &["add", "--username", "owner", "--role", "Owner", "--perm", "addNew"]).unwrap();
    let owner = lookup(&conn, "owner");

    let entries = activity::recent(&conn, 10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].user, "admin");
    assert_eq!(entries[0].role, "Technical Team");
    assert_eq!(entries[0].details["username"], "owner");
    assert_eq!(activity::recent(&conn, 1).unwrap().len(), 1);

    let m = sub_matches(&["activity", "list"]);
    assert!(activity::handle(&conn, Some(&admin), &m).is_ok());
    let err = activity::handle(&conn, Some(&owner), &m).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::Restricted { .. })));
}

#[test]
fn settings_default_and_only_superusers_change_them() {
    let conn = setup();
    assert_eq!(currency_symbol(&conn).unwrap(), "₹");
    assert_eq!(default_limit(&conn).unwrap(), 50);

    user(&conn, None, &["add", "--username", "admin", "--role", "Technical Team"]).unwrap();
    let admin = lookup(&conn, "admin");
    user(&conn, Some(&admin), &["add", "--username", "owner", "--role", "Owner"]).unwrap();
    let owner = lookup(&conn, "owner");

    let set = sub_matches(&["config", "set", "default_limit", "20"]);
    assert!(config::handle(&conn, Some(&owner), &set).is_err());
    config::handle(&conn, Some(&admin), &set).unwrap();
    assert_eq!(default_limit(&conn).unwrap(), 20);

    let bad = sub_matches(&["config", "set", "default_limit", "lots"]);
    assert!(config::handle(&conn, Some(&admin), &bad).is_err());
    let unknown = sub_matches(&["config", "set", "theme", "dark"]);
    assert!(config::handle(&conn, Some(&admin), &unknown).is_err());
    assert_eq!(default_limit(&conn).unwrap(), 20);
}

#[test]
fn listing_users_needs_add_new() {
    let conn = setup();
    user(&conn, None, &["add", "--username", "admin", "--role", "Technical Team"]).unwrap();
    let admin = lookup(&conn, "admin");
    user(&conn, Some(&admin), &["add", "--username", "meena", "--perm", "add"]).unwrap();
    let meena = lookup(&conn, "meena");

    let err = user(&conn, None, &["list", "--json"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::NotSignedIn)));
    let err = user(&conn, Some(&meena), &["list", "--json"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UdhError>(),
        Some(UdhError::PermissionDenied { capability: Capability::AddNew, .. })
    ));
    user(&conn, Some(&admin), &["list", "--json"]).unwrap();
}

#[test]
fn first_user_must_be_able_to_add_others() {
    let conn = setup();
    let err = user(&conn, None, &["add", "--username", "meena", "--role", "Staff"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::Validation(_))));
    assert!(load_users(&conn).unwrap().is_empty());

    user(
        &conn,
        None,
        &["add", "--username", "owner", "--role", "Owner", "--perm", "addNew"],
    )
    .unwrap();
    let owner = lookup(&conn, "owner");
    user(&conn, Some(&owner), &["add", "--username", "meena"]).unwrap();
    assert_eq!(load_users(&conn).unwrap().len(), 2);
}

#[test]
fn reading_settings_needs_a_signed_in_user() {
    let conn = setup();
    let get = sub_matches(&["config", "get"]);
    let err = config::handle(&conn, None, &get).unwrap_err();
    assert!(matches!(err.downcast_ref::<UdhError>(), Some(UdhError::NotSignedIn)));
}
