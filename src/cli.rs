// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn account_id() -> Arg {
    Arg::new("id").required(true).help("Trade account id")
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .help("Calendar month (default: current month)")
}

fn page_arg() -> Arg {
    Arg::new("page")
        .long("page")
        .value_parser(value_parser!(usize))
        .default_value("1")
}

pub fn build_cli() -> Command {
    command!()
        .about("Multi-account crypto income, PnL calendar and cumulative chart")
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show").about("Print current settings"))
                .subcommand(Command::new("path").about("Print config file location"))
                .subcommand(
                    Command::new("set")
                        .about("Set a config key")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true).allow_hyphen_values(true)),
                ),
        )
        .subcommand(
            Command::new("accounts")
                .about("Trade accounts")
                .subcommand(
                    Command::new("list")
                        .about("List trade accounts")
                        .arg(
                            Arg::new("balances")
                                .long("balances")
                                .action(ArgAction::SetTrue)
                                .help("Fetch each account's balance"),
                        )
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Single trade account views")
                .subcommand(
                    Command::new("show")
                        .about("Account details")
                        .arg(account_id())
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("balance")
                        .arg(account_id())
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("positions")
                        .arg(account_id())
                        .args(json_flags()),
                )
                .subcommand(Command::new("orders").arg(account_id()).args(json_flags()))
                .subcommand(
                    Command::new("trades")
                        .arg(account_id())
                        .arg(Arg::new("symbol").long("symbol").required(true))
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("snapshots")
                        .arg(account_id())
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .value_parser(value_parser!(u32))
                                .default_value("30"),
                        )
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("income")
                        .about("Income ledger with running profit")
                        .arg(account_id())
                        .arg(page_arg())
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("income")
                .about("Combined income across all accounts")
                .subcommand(
                    Command::new("table")
                        .about("Daily income per account, newest first")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .action(ArgAction::Append)
                                .value_name("INCOME_TYPE")
                                .help("Only count these income types (repeatable)"),
                        )
                        .arg(page_arg())
                        .arg(
                            Arg::new("rows")
                                .long("rows")
                                .value_parser(value_parser!(usize))
                                .help("Rows per page (default from config)"),
                        )
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("chart")
                        .about("Cumulative income per account over time")
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("calendar")
                        .about("Month calendar of daily income")
                        .arg(month_arg())
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("export")
                        .about("Write daily or cumulative income to a file")
                        .arg(
                            Arg::new("view")
                                .long("view")
                                .value_parser(["daily", "series"])
                                .default_value("daily"),
                        )
                        .arg(Arg::new("format").long("format").required(true))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("pnl").about("Profit and loss").subcommand(
                Command::new("monthly")
                    .about("Monthly PnL per account")
                    .arg(month_arg())
                    .args(json_flags()),
            ),
        )
}
