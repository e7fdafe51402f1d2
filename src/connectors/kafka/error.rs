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

use std::fmt::Display;
use std::time::Duration;

use itertools::Itertools;
use thiserror::Error;

/// A supplied value could not be coerced to the type of its property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for '{property}': {reason}")]
pub struct ParseError {
    pub property: &'static str,
    pub value: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(property: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            property,
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// One unmet constraint found by the validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("'{property}' is mandatory and was not supplied")]
    Missing { property: &'static str },

    #[error("'{property}' must list at least {minimum} entries, found {actual}")]
    TooFewEntries {
        property: &'static str,
        minimum: usize,
        actual: usize,
    },

    #[error(
        "'{property}' must be at least {}, was {}",
        humanize(.minimum),
        humanize(.actual)
    )]
    BelowMinimum {
        property: &'static str,
        minimum: Duration,
        actual: Duration,
    },

    #[error("'{property}' must not be blank")]
    Blank { property: &'static str },
}

impl Violation {
    pub fn property(&self) -> &'static str {
        match self {
            Violation::Missing { property }
            | Violation::TooFewEntries { property, .. }
            | Violation::BelowMinimum { property, .. }
            | Violation::Blank { property } => property,
        }
    }
}

/// Every violation found by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid connector configuration: {}", join(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown configuration property '{0}'")]
    UnknownProperty(String),

    #[error(transparent)]
    Violation(#[from] Violation),
}

/// Everything that went wrong while loading a property set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join(.0))]
pub struct LoadErrors(pub Vec<ConfigError>);

impl LoadErrors {
    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter().join("; ")
}

fn humanize(duration: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*duration)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ConfigError, LoadErrors, ParseError, ValidationError, Violation};

    #[test]
    fn validation_error_lists_every_violation() {
        let err = ValidationError::new(vec![
            Violation::Missing {
                property: "kafka.nodes",
            },
            Violation::BelowMinimum {
                property: "kafka.connect-timeout",
                minimum: Duration::from_secs(1),
                actual: Duration::from_millis(500),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "invalid connector configuration: 'kafka.nodes' is mandatory and was not supplied; \
             'kafka.connect-timeout' must be at least 1s, was 500ms"
        );
    }

    #[test]
    fn parse_error_names_property_and_value() {
        let err = ParseError::new("kafka.buffer-size", "lots", "unknown size unit 'lots'");
        assert_eq!(
            err.to_string(),
            "invalid value \"lots\" for 'kafka.buffer-size': unknown size unit 'lots'"
        );
    }

    #[test]
    fn load_errors_join_messages() {
        let errors = LoadErrors(vec![
            ConfigError::UnknownProperty("kafka.nodez".to_owned()),
            ConfigError::from(Violation::Blank {
                property: "kafka.default-schema",
            }),
        ]);
        assert_eq!(
            errors.to_string(),
            "unknown configuration property 'kafka.nodez'; 'kafka.default-schema' must not be blank"
        );
        assert_eq!(errors.errors()[1].to_string(), "'kafka.default-schema' must not be blank");
    }
}
