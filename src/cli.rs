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

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::option::validation;

pub const CONFIG_FILE_ENV: &str = "KAFKA_CONNECTOR_CONFIG";

#[derive(Parser, Debug)]
#[command(
    name = "kafka-connector-config",
    bin_name = "kafka-connector-config",
    about = "Checks and describes the configuration of the Kafka catalog connector.",
    long_about = r#"
Checks and describes the configuration of the Kafka catalog connector.

Usage:
kafka-connector-config [command] [options..]


Help:
kafka-connector-config [command] --help

"#,
    arg_required_else_help = true,
    color = clap::ColorChoice::Always,
    version = env!("CARGO_PKG_VERSION"),
    propagate_version = true,
    next_line_help = false,
    subcommand_required = true
)]
pub struct Cli {
    #[arg(
        long = "log-level",
        env = "KAFKA_CONNECTOR_LOG_LEVEL",
        global = true,
        default_value = "warn",
        value_name = "level",
        help = "Default log level, RUST_LOG takes precedence when set"
    )]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a connector configuration
    #[command(name = "check")]
    Check(CheckArgs),

    /// List every recognized property
    #[command(name = "describe")]
    Describe,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(
        short = 'c',
        long = "config-file",
        env = CONFIG_FILE_ENV,
        value_name = "path",
        value_parser = validation::file_path,
        help = "Catalog file to load (.properties or .toml)"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        long = "set",
        value_name = "property=value",
        value_parser = validation::key_value,
        help = "Override a property, may be repeated"
    )]
    pub overrides: Vec<(String, String)>,

    #[arg(
        value_enum,
        long = "format",
        default_value_t = OutputFormat::Text,
        help = "How to print the validated configuration"
    )]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::{Cli, Command, OutputFormat};

    #[test]
    fn check_collects_repeated_overrides() {
        let cli = Cli::try_parse_from([
            "kafka-connector-config",
            "check",
            "--set",
            "kafka.nodes=a,b",
            "--set",
            "kafka.table-names=t",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(
            args.overrides,
            vec![
                ("kafka.nodes".to_owned(), "a,b".to_owned()),
                ("kafka.table-names".to_owned(), "t".to_owned()),
            ]
        );
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[rstest]
    #[case(&["kafka-connector-config", "check", "--set", "novalue"])]
    #[case(&["kafka-connector-config", "check", "-c", "/definitely/not/here.properties"])]
    #[case(&["kafka-connector-config", "check", "--format", "yaml"])]
    fn rejects_bad_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn log_level_defaults_to_warn() {
        let cli = Cli::try_parse_from(["kafka-connector-config", "describe"]).unwrap();
        assert_eq!(cli.log_level, tracing::level_filters::LevelFilter::WARN);
        assert!(
            Cli::try_parse_from(["kafka-connector-config", "--log-level", "loud", "describe"])
                .is_err()
        );
    }

    #[test]
    fn describe_takes_no_arguments() {
        let cli = Cli::try_parse_from(["kafka-connector-config", "describe"]).unwrap();
        assert!(matches!(cli.command, Command::Describe));
    }

    #[test]
    fn debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
