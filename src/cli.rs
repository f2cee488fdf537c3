// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    ]
}

fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .value_parser(["sales", "buy"])
        .help("Sales or buy side")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn tx_fields(required: bool) -> Vec<Arg> {
    vec![
        Arg::new("date").long("date").help("YYYY-MM-DD (default: today)"),
        Arg::new("type")
            .long("type")
            .required(required)
            .value_parser(["buy", "sell"]),
        Arg::new("name")
            .long("name")
            .required(required)
            .help("Customer or dealer name"),
        Arg::new("product").long("product").required(required),
        Arg::new("size").long("size").required(required),
        Arg::new("qty").long("qty").required(required),
        Arg::new("amount")
            .long("amount")
            .help("Total amount (default: catalog price x qty)"),
        Arg::new("status")
            .long("status")
            .value_parser(["purchased", "booked", "returned"]),
        Arg::new("method").long("method").help("Payment method"),
        Arg::new("upi").long("upi").help("Payment reference"),
        Arg::new("paid").long("paid").help("Amount paid so far"),
        Arg::new("promise")
            .long("promise")
            .help("Promised payment date YYYY-MM-DD"),
        Arg::new("contact")
            .long("contact")
            .help("Contact number, required for a new customer/dealer"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("udh")
        .about("UDH: inventory, sales/purchase ledger and trader directory")
        .version(clap::crate_version!())
        .arg(
            Arg::new("as")
                .long("as")
                .global(true)
                .env("UDH_USER")
                .help("Act as this user"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("UDH_DB")
                .help("Database file (default: platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("tx")
                .about("Buy/sell transactions")
                .subcommand(Command::new("add").args(tx_fields(true)))
                .subcommand(
                    Command::new("list")
                        .arg(mode_arg())
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("name").long("name").help("Name contains"))
                        .arg(Arg::new("product").long("product"))
                        .arg(Arg::new("size").long("size").help("Size contains"))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["purchased", "booked", "returned"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .default_value("100"),
                        )
                        .args(json_args()),
                )
                .subcommand(Command::new("edit").arg(id_arg()).args(tx_fields(false)))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    Command::new("print").arg(id_arg()).arg(
                        Arg::new("format")
                            .long("format")
                            .value_parser(["bill", "invoice"])
                            .default_value("bill"),
                    ),
                ),
        )
        .subcommand(
            Command::new("catalog")
                .about("Product price lists")
                .subcommand(
                    Command::new("add")
                        .arg(mode_arg().default_value("sales"))
                        .arg(Arg::new("product").long("product").required(true))
                        .arg(Arg::new("size").long("size").required(true))
                        .arg(Arg::new("price").long("price").default_value("0"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(i64))
                                .help("Low-stock threshold"),
                        ),
                )
                .subcommand(Command::new("list").arg(mode_arg()).args(json_args()))
                .subcommand(
                    Command::new("limit").arg(id_arg()).arg(
                        Arg::new("value")
                            .long("value")
                            .value_parser(value_parser!(i64))
                            .help("Threshold (default: the default_limit setting)"),
                    ),
                )
                .subcommand(
                    Command::new("price")
                        .arg(id_arg())
                        .arg(Arg::new("price").long("price").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("trader")
                .about("Customers and dealers")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("contact").long("contact").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["Customer", "Dealer"])
                                .default_value("Customer"),
                        ),
                )
                .subcommand(Command::new("list").arg(mode_arg()).args(json_args()))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("contact").long("contact"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["Customer", "Dealer"]),
                        ),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    Command::new("show")
                        .arg(Arg::new("name").long("name").required(true))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("stock")
                .about("Current stock derived from transactions")
                .subcommand(
                    Command::new("list")
                        .arg(mode_arg().default_value("sales"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("ledger")
                        .arg(Arg::new("product").long("product").required(true))
                        .arg(Arg::new("size").long("size").required(true))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("CSV reports")
                .subcommand(
                    Command::new("sales")
                        .arg(mode_arg().default_value("sales"))
                        .arg(Arg::new("out").long("out")),
                )
                .subcommand(
                    Command::new("stock")
                        .arg(mode_arg().default_value("sales"))
                        .arg(Arg::new("out").long("out")),
                )
                .subcommand(Command::new("customers").arg(Arg::new("out").long("out"))),
        )
        .subcommand(
            Command::new("backup")
                .about("Full JSON backup and restore")
                .subcommand(Command::new("export").arg(Arg::new("out").long("out")))
                .subcommand(
                    Command::new("restore").arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("user")
                .about("User administration")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("username").long("username").required(true))
                        .arg(Arg::new("role").long("role").default_value("Staff"))
                        .arg(
                            Arg::new("perm")
                                .long("perm")
                                .value_delimiter(',')
                                .action(ArgAction::Append)
                                .help("Granted capabilities, e.g. add,edit,reports"),
                        ),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("username").long("username").required(true))
                        .arg(Arg::new("role").long("role"))
                        .arg(
                            Arg::new("grant")
                                .long("grant")
                                .value_delimiter(',')
                                .action(ArgAction::Append),
                        )
                        .arg(
                            Arg::new("revoke")
                                .long("revoke")
                                .value_delimiter(',')
                                .action(ArgAction::Append),
                        ),
                )
                .subcommand(
                    Command::new("rm").arg(Arg::new("username").long("username").required(true)),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Totals, stock value, reminders and chart series")
                .arg(mode_arg().default_value("sales"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("activity").about("Audit trail").subcommand(
                Command::new("list")
                    .arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize))
                            .default_value("50"),
                    )
                    .args(json_args()),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("get").arg(Arg::new("key")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Data health checks"))
}
