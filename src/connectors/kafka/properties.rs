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

//! Every recognized configuration property, described once.
//!
//! The validation pass walks [`PROPERTIES`] and checks each field through its
//! descriptor, so adding a property never means adding validation code.

use std::collections::BTreeSet;
use std::time::Duration;

use super::config::{ConnectorConfig, ConnectorConfigBuilder, REDACTED};
use super::error::{ParseError, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    None,
    NotBlank,
    MinEntries(usize),
    MinDuration(Duration),
}

/// What the validation pass needs to know about the current value of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldValue {
    Entries(usize),
    Duration(Duration),
    Text { blank: bool },
    Opaque,
}

pub struct PropertyDescriptor {
    pub name: &'static str,
    pub env: &'static str,
    pub description: &'static str,
    /// Default as documented for operators. Typed fields start out with it,
    /// pass-through fields only get it in `client_properties`.
    pub default_value: Option<&'static str>,
    pub required: bool,
    pub constraint: Constraint,
    pub sensitive: bool,
    /// Whether the value is handed to the messaging client as is.
    pub client: bool,
    pub(crate) apply: fn(&mut ConnectorConfigBuilder, &str) -> Result<(), ParseError>,
    pub(crate) inspect: fn(&ConnectorConfigBuilder) -> FieldValue,
}

impl PropertyDescriptor {
    /// The value as it may appear in logs and summaries.
    pub fn shown<'a>(&self, raw: &'a str) -> &'a str {
        if self.sensitive {
            REDACTED
        } else {
            raw
        }
    }

    fn check(&self, builder: &ConnectorConfigBuilder) -> Option<Violation> {
        if self.required && !builder.is_supplied(self.name) {
            return Some(Violation::Missing {
                property: self.name,
            });
        }

        match (self.constraint, (self.inspect)(builder)) {
            (Constraint::MinEntries(minimum), FieldValue::Entries(actual)) if actual < minimum => {
                Some(Violation::TooFewEntries {
                    property: self.name,
                    minimum,
                    actual,
                })
            }
            (Constraint::MinDuration(minimum), FieldValue::Duration(actual)) if actual < minimum => {
                Some(Violation::BelowMinimum {
                    property: self.name,
                    minimum,
                    actual,
                })
            }
            (Constraint::NotBlank, FieldValue::Text { blank: true }) => Some(Violation::Blank {
                property: self.name,
            }),
            _ => None,
        }
    }
}

pub const MIN_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

pub static PROPERTIES: [PropertyDescriptor; 15] = [
    PropertyDescriptor {
        name: ConnectorConfig::NODES,
        env: "KAFKA_NODES",
        description: "List of nodes in the Kafka cluster",
        default_value: None,
        required: true,
        constraint: Constraint::MinEntries(1),
        sensitive: false,
        client: false,
        apply: |builder, raw| builder.set_nodes(raw).map(|_| ()),
        inspect: |builder| FieldValue::Entries(builder.nodes.len()),
    },
    PropertyDescriptor {
        name: ConnectorConfig::TABLE_NAMES,
        env: "KAFKA_TABLE_NAMES",
        description: "List of all tables provided by the catalog",
        default_value: None,
        required: true,
        constraint: Constraint::MinEntries(1),
        sensitive: false,
        client: false,
        apply: |builder, raw| {
            builder.set_table_names(raw);
            Ok(())
        },
        inspect: |builder| FieldValue::Entries(builder.table_names.len()),
    },
    PropertyDescriptor {
        name: ConnectorConfig::DEFAULT_SCHEMA,
        env: "KAFKA_DEFAULT_SCHEMA",
        description: "Default schema name to use",
        default_value: Some("default"),
        required: false,
        constraint: Constraint::NotBlank,
        sensitive: false,
        client: false,
        apply: |builder, raw| {
            builder.set_default_schema(raw);
            Ok(())
        },
        inspect: |builder| FieldValue::Text {
            blank: builder.default_schema.trim().is_empty(),
        },
    },
    PropertyDescriptor {
        name: ConnectorConfig::TABLE_DESCRIPTION_DIR,
        env: "KAFKA_TABLE_DESCRIPTION_DIR",
        description: "Folder holding the JSON description files for Kafka topics",
        default_value: Some("etc/kafka/"),
        required: false,
        constraint: Constraint::NotBlank,
        sensitive: false,
        client: false,
        apply: |builder, raw| {
            builder.set_table_description_dir(raw.trim());
            Ok(())
        },
        inspect: |builder| FieldValue::Text {
            blank: builder.table_description_dir.as_os_str().is_empty(),
        },
    },
    PropertyDescriptor {
        name: ConnectorConfig::CONNECT_TIMEOUT,
        env: "KAFKA_CONNECT_TIMEOUT",
        description: "Timeout to connect to Kafka",
        default_value: Some("10s"),
        required: false,
        constraint: Constraint::MinDuration(MIN_CONNECT_TIMEOUT),
        sensitive: false,
        client: false,
        apply: |builder, raw| builder.set_connect_timeout(raw).map(|_| ()),
        inspect: |builder| FieldValue::Duration(builder.connect_timeout),
    },
    PropertyDescriptor {
        name: ConnectorConfig::BUFFER_SIZE,
        env: "KAFKA_BUFFER_SIZE",
        description: "Buffer size for connecting to Kafka",
        default_value: Some("64kB"),
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: false,
        apply: |builder, raw| builder.set_buffer_size(raw).map(|_| ()),
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::HIDE_INTERNAL_COLUMNS,
        env: "KAFKA_HIDE_INTERNAL_COLUMNS",
        description: "Whether internal columns are hidden from table metadata",
        default_value: Some("true"),
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: false,
        apply: |builder, raw| builder.parse_hide_internal_columns(raw).map(|_| ()),
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::SECURITY_PROTOCOL,
        env: "KAFKA_SECURITY_PROTOCOL",
        description: "Security protocol used to talk to the brokers",
        default_value: Some("SASL_PLAINTEXT"),
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: true,
        apply: |builder, raw| {
            builder.set_security_protocol(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::SASL_MECHANISM,
        env: "KAFKA_SASL_MECHANISM",
        description: "SASL mechanism used for authentication",
        default_value: Some("GSSAPI"),
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: true,
        apply: |builder, raw| {
            builder.set_sasl_mechanism(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::SASL_KERBEROS_SERVICE_NAME,
        env: "KAFKA_SASL_KERBEROS_SERVICE_NAME",
        description: "Kerberos principal name that Kafka runs as",
        default_value: Some("kafka"),
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: true,
        apply: |builder, raw| {
            builder.set_sasl_kerberos_service_name(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::LOGIN_CONFIG,
        env: "KAFKA_SASL_JAAS_CONFIG",
        description: "Path or inline content of the client JAAS login configuration",
        default_value: None,
        required: false,
        constraint: Constraint::None,
        sensitive: true,
        client: false,
        apply: |builder, raw| {
            builder.set_login_config(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::KRB5_CONF,
        env: "KAFKA_KRB5_CONF",
        description: "Path of the krb5.conf file",
        default_value: None,
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: false,
        apply: |builder, raw| {
            builder.set_krb5_conf(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::GROUP_ID,
        env: "KAFKA_GROUP_ID",
        description: "Consumer group id",
        default_value: Some("test"),
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: true,
        apply: |builder, raw| {
            builder.set_group_id(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::KERBEROS_ON,
        env: "KAFKA_KERBEROS_ON",
        description: "Whether to use kerberos",
        default_value: Some("false"),
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: false,
        apply: |builder, raw| {
            builder.set_kerberos_on(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
    PropertyDescriptor {
        name: ConnectorConfig::USER_PASSWORD_AUTH_ON,
        env: "KAFKA_USER_PASSWORD_AUTH_ON",
        description: "Whether to use user and password authentication",
        default_value: None,
        required: false,
        constraint: Constraint::None,
        sensitive: false,
        client: false,
        apply: |builder, raw| {
            builder.set_user_password_auth_on(raw);
            Ok(())
        },
        inspect: |_| FieldValue::Opaque,
    },
];

pub fn descriptor(name: &str) -> Option<&'static PropertyDescriptor> {
    PROPERTIES.iter().find(|descriptor| descriptor.name == name)
}

/// Runs every descriptor's checks, skipping the properties in `skip`.
pub(crate) fn check_all(
    builder: &ConnectorConfigBuilder,
    skip: &BTreeSet<&'static str>,
) -> Vec<Violation> {
    PROPERTIES
        .iter()
        .filter(|descriptor| !skip.contains(descriptor.name))
        .filter_map(|descriptor| descriptor.check(builder))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;

    use super::{check_all, descriptor, PROPERTIES};
    use crate::connectors::kafka::config::ConnectorConfigBuilder;
    use crate::connectors::kafka::error::Violation;

    #[test]
    fn names_and_env_vars_are_unique() {
        let names: BTreeSet<_> = PROPERTIES.iter().map(|d| d.name).collect();
        let envs: BTreeSet<_> = PROPERTIES.iter().map(|d| d.env).collect();
        assert_eq!(names.len(), PROPERTIES.len());
        assert_eq!(envs.len(), PROPERTIES.len());
    }

    #[test]
    fn documented_defaults_match_builder_defaults() {
        let defaults = ConnectorConfigBuilder::default();
        for descriptor in PROPERTIES.iter().filter(|d| d.name.starts_with("kafka.")) {
            let Some(value) = descriptor.default_value else {
                continue;
            };
            let mut builder = ConnectorConfigBuilder::default();
            (descriptor.apply)(&mut builder, value).unwrap();
            assert_eq!(
                format!("{:?}", builder.without_supplied()),
                format!("{defaults:?}"),
                "{}",
                descriptor.name
            );
        }
    }

    #[rstest]
    #[case("kafka.nodes", true)]
    #[case("kafka.table-names", true)]
    #[case("kafka.connect-timeout", false)]
    #[case("group.id", false)]
    fn required_flags(#[case] name: &str, #[case] required: bool) {
        assert_eq!(descriptor(name).unwrap().required, required);
    }

    #[test]
    fn unknown_descriptor() {
        assert!(descriptor("kafka.node").is_none());
    }

    #[test]
    fn sensitive_values_are_redacted() {
        let jaas = descriptor("sasl.jaas.config").unwrap();
        assert_eq!(jaas.shown("password=hunter2"), "******");
        assert_eq!(descriptor("group.id").unwrap().shown("g1"), "g1");
    }

    #[test]
    fn skipped_properties_are_not_checked() {
        let builder = ConnectorConfigBuilder::default();
        let skip = BTreeSet::from(["kafka.nodes"]);
        assert_eq!(
            check_all(&builder, &skip),
            vec![Violation::Missing {
                property: "kafka.table-names"
            }]
        );
    }
}
