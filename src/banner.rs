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

use crossterm::style::Stylize;
use itertools::Itertools;

use crate::connectors::kafka::config::ConnectorConfig;
use crate::connectors::kafka::error::LoadErrors;
use crate::connectors::kafka::properties::{Constraint, PROPERTIES};

pub fn print(config: &ConnectorConfig) {
    cluster_info(config);
    catalog_info(config);
    security_info(config);
    println!();
}

fn cluster_info(config: &ConnectorConfig) {
    println!(
        "
    {}
        Nodes:              \"{}\"
        Connect Timeout:    \"{}\"
        Buffer Size:        \"{}\"",
        "Cluster:".to_string().bold(),
        config.bootstrap_servers(),
        humantime::format_duration(config.connect_timeout()),
        config.buffer_size(),
    );
}

fn catalog_info(config: &ConnectorConfig) {
    println!(
        "
    {}
        Default Schema:     \"{}\"
        Tables:             \"{}\"
        Description Dir:    \"{}\"
        Internal Columns:   \"{}\"",
        "Catalog:".to_string().bold(),
        config.default_schema(),
        config.table_names().iter().join(", "),
        config.table_description_dir().display(),
        if config.hide_internal_columns() {
            "hidden"
        } else {
            "visible"
        },
    );
}

fn security_info(config: &ConnectorConfig) {
    println!("\n    {}", "Security:".to_string().bold());

    for descriptor in PROPERTIES.iter().filter(|d| !d.name.starts_with("kafka.")) {
        let value = match config.pass_through_or_default(descriptor.name) {
            Some(value) => format!("\"{}\"", descriptor.shown(value)),
            None => "Not Configured".grey().to_string(),
        };
        println!("        {:<28}{}", descriptor.name, value);
    }
}

/// The `describe` listing.
pub fn print_properties() {
    for descriptor in PROPERTIES.iter() {
        let required = if descriptor.required {
            "required".red().to_string()
        } else {
            "optional".grey().to_string()
        };

        println!(
            "
    {} ({})
        Env:                {}
        Default:            {}
        Constraint:         {}
        {}",
            descriptor.name.bold(),
            required,
            descriptor.env,
            descriptor.default_value.unwrap_or("-"),
            describe_constraint(descriptor.constraint),
            descriptor.description,
        );
    }
    println!();
}

fn describe_constraint(constraint: Constraint) -> String {
    match constraint {
        Constraint::None => "-".to_owned(),
        Constraint::NotBlank => "not blank".to_owned(),
        Constraint::MinEntries(1) => "at least one entry".to_owned(),
        Constraint::MinEntries(minimum) => format!("at least {minimum} entries"),
        Constraint::MinDuration(minimum) => {
            format!("at least {}", humantime::format_duration(minimum))
        }
    }
}

pub fn print_errors(errors: &LoadErrors) {
    eprintln!(
        "
    {}",
        "Invalid connector configuration:".to_string().red().bold()
    );
    for error in errors.errors() {
        eprintln!("        - {error}");
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{describe_constraint, Constraint};

    #[rstest]
    #[case(Constraint::None, "-")]
    #[case(Constraint::NotBlank, "not blank")]
    #[case(Constraint::MinEntries(1), "at least one entry")]
    #[case(Constraint::MinEntries(3), "at least 3 entries")]
    #[case(Constraint::MinDuration(Duration::from_secs(1)), "at least 1s")]
    fn constraint_descriptions(#[case] constraint: Constraint, #[case] expected: &str) {
        assert_eq!(describe_constraint(constraint), expected);
    }
}
