/*
 * Parseable Server (C) 2022 - 2025 Parseable, Inc.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 *
 */

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use kafka_connector_config::{
    banner,
    cli::{CheckArgs, Cli, Command, OutputFormat},
    config_loader,
    connectors::kafka::ConnectorConfig,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    match cli.command {
        Command::Check(args) => check(args),
        Command::Describe => {
            banner::print_properties();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let properties = config_loader::load(args.config_file.as_deref(), &args.overrides)?;

    match (ConnectorConfig::from_properties(&properties), args.format) {
        (Ok(config), OutputFormat::Text) => {
            banner::print(&config);
            Ok(ExitCode::SUCCESS)
        }
        (Ok(config), OutputFormat::Json) => {
            let summary = serde_json::to_string_pretty(&config)
                .context("Failed to serialize connector configuration")?;
            println!("{summary}");
            Ok(ExitCode::SUCCESS)
        }
        (Err(errors), OutputFormat::Text) => {
            banner::print_errors(&errors);
            Ok(ExitCode::FAILURE)
        }
        (Err(errors), OutputFormat::Json) => {
            let messages: Vec<String> = errors.errors().iter().map(ToString::to_string).collect();
            println!("{}", serde_json::json!({ "errors": messages }));
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn init_logger(default_level: LevelFilter) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_line_number(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .compact();

    Registry::default()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
