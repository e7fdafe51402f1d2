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

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use itertools::Itertools;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use super::error::{ConfigError, LoadErrors, ParseError, ValidationError};
use super::properties;
use crate::option::validation;
use crate::utils::host_address::HostAddress;
use crate::utils::human_size::{DataSize, DataUnit};

pub const KAFKA_DEFAULT_PORT: u16 = 9092;
pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
pub const REDACTED: &str = "******";

/// A value that never shows up in logs, `Debug` output or serialized summaries.
#[derive(Clone, PartialEq, Eq)]
struct Secret(String);

impl Secret {
    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

/// Setup phase of a [`ConnectorConfig`].
///
/// Starts out with every default, each setter overwrites one field. Nothing is
/// checked across fields until [`ConnectorConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct ConnectorConfigBuilder {
    pub(super) nodes: BTreeSet<HostAddress>,
    pub(super) connect_timeout: Duration,
    pub(super) buffer_size: DataSize,
    pub(super) default_schema: String,
    pub(super) table_names: BTreeSet<String>,
    pub(super) table_description_dir: PathBuf,
    pub(super) hide_internal_columns: bool,
    security_protocol: Option<String>,
    sasl_mechanism: Option<String>,
    sasl_kerberos_service_name: Option<String>,
    kerberos_on: Option<String>,
    login_config: Option<Secret>,
    krb5_conf: Option<String>,
    group_id: Option<String>,
    user_password_auth_on: Option<String>,
    supplied: BTreeSet<&'static str>,
}

impl Default for ConnectorConfigBuilder {
    fn default() -> Self {
        Self {
            nodes: BTreeSet::new(),
            connect_timeout: Duration::from_secs(10),
            buffer_size: DataSize::new(64.0, DataUnit::Kilobyte),
            default_schema: "default".to_owned(),
            table_names: BTreeSet::new(),
            table_description_dir: PathBuf::from("etc/kafka/"),
            hide_internal_columns: true,
            security_protocol: None,
            sasl_mechanism: None,
            sasl_kerberos_service_name: None,
            kerberos_on: None,
            login_config: None,
            krb5_conf: None,
            group_id: None,
            user_password_auth_on: None,
            supplied: BTreeSet::new(),
        }
    }
}

impl ConnectorConfigBuilder {
    pub fn set_nodes(&mut self, raw: &str) -> Result<&mut Self, ParseError> {
        self.nodes = validation::kafka_nodes(raw)
            .map_err(|reason| ParseError::new(ConnectorConfig::NODES, raw, reason))?;
        Ok(self.mark(ConnectorConfig::NODES, raw))
    }

    pub fn set_connect_timeout(&mut self, raw: &str) -> Result<&mut Self, ParseError> {
        self.connect_timeout = validation::duration(raw)
            .map_err(|reason| ParseError::new(ConnectorConfig::CONNECT_TIMEOUT, raw, reason))?;
        Ok(self.mark(ConnectorConfig::CONNECT_TIMEOUT, raw))
    }

    pub fn set_buffer_size(&mut self, raw: &str) -> Result<&mut Self, ParseError> {
        self.buffer_size = validation::data_size(raw)
            .map_err(|reason| ParseError::new(ConnectorConfig::BUFFER_SIZE, raw, reason))?;
        Ok(self.mark(ConnectorConfig::BUFFER_SIZE, raw))
    }

    pub fn set_default_schema(&mut self, schema: impl Into<String>) -> &mut Self {
        self.default_schema = schema.into();
        let raw = self.default_schema.clone();
        self.mark(ConnectorConfig::DEFAULT_SCHEMA, &raw)
    }

    pub fn set_table_names(&mut self, raw: &str) -> &mut Self {
        self.table_names = validation::string_set(raw);
        self.mark(ConnectorConfig::TABLE_NAMES, raw)
    }

    pub fn set_table_description_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.table_description_dir = dir.into();
        let raw = self.table_description_dir.to_string_lossy().into_owned();
        self.mark(ConnectorConfig::TABLE_DESCRIPTION_DIR, &raw)
    }

    pub fn set_hide_internal_columns(&mut self, hide: bool) -> &mut Self {
        self.hide_internal_columns = hide;
        self.supplied.insert(ConnectorConfig::HIDE_INTERNAL_COLUMNS);
        self
    }

    pub fn parse_hide_internal_columns(&mut self, raw: &str) -> Result<&mut Self, ParseError> {
        let hide = validation::boolean(raw).map_err(|reason| {
            ParseError::new(ConnectorConfig::HIDE_INTERNAL_COLUMNS, raw, reason)
        })?;
        Ok(self.set_hide_internal_columns(hide))
    }

    pub fn set_security_protocol(&mut self, protocol: impl Into<String>) -> &mut Self {
        let value = protocol.into();
        self.mark(ConnectorConfig::SECURITY_PROTOCOL, &value);
        self.security_protocol = Some(value);
        self
    }

    pub fn set_sasl_mechanism(&mut self, mechanism: impl Into<String>) -> &mut Self {
        let value = mechanism.into();
        self.mark(ConnectorConfig::SASL_MECHANISM, &value);
        self.sasl_mechanism = Some(value);
        self
    }

    pub fn set_sasl_kerberos_service_name(&mut self, name: impl Into<String>) -> &mut Self {
        let value = name.into();
        self.mark(ConnectorConfig::SASL_KERBEROS_SERVICE_NAME, &value);
        self.sasl_kerberos_service_name = Some(value);
        self
    }

    pub fn set_kerberos_on(&mut self, flag: impl Into<String>) -> &mut Self {
        let value = flag.into();
        self.mark(ConnectorConfig::KERBEROS_ON, &value);
        self.kerberos_on = Some(value);
        self
    }

    pub fn set_login_config(&mut self, config: impl Into<String>) -> &mut Self {
        let value = config.into();
        self.mark(ConnectorConfig::LOGIN_CONFIG, &value);
        self.login_config = Some(Secret(value));
        self
    }

    pub fn set_krb5_conf(&mut self, path: impl Into<String>) -> &mut Self {
        let value = path.into();
        self.mark(ConnectorConfig::KRB5_CONF, &value);
        self.krb5_conf = Some(value);
        self
    }

    pub fn set_group_id(&mut self, group_id: impl Into<String>) -> &mut Self {
        let value = group_id.into();
        self.mark(ConnectorConfig::GROUP_ID, &value);
        self.group_id = Some(value);
        self
    }

    pub fn set_user_password_auth_on(&mut self, flag: impl Into<String>) -> &mut Self {
        let value = flag.into();
        self.mark(ConnectorConfig::USER_PASSWORD_AUTH_ON, &value);
        self.user_password_auth_on = Some(value);
        self
    }

    /// Sets a property by its configuration name.
    pub fn apply(&mut self, name: &str, raw: &str) -> Result<&mut Self, ConfigError> {
        let descriptor = properties::descriptor(name)
            .ok_or_else(|| ConfigError::UnknownProperty(name.to_owned()))?;

        debug!(
            property = descriptor.name,
            value = descriptor.shown(raw),
            "Applying connector property"
        );
        (descriptor.apply)(self, raw)?;

        Ok(self)
    }

    /// Checks every field against its descriptor and reports all violations at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let violations = properties::check_all(self, &BTreeSet::new());
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    pub fn build(self) -> Result<ConnectorConfig, ValidationError> {
        self.validate()?;
        Ok(self.freeze())
    }

    pub(crate) fn is_supplied(&self, property: &str) -> bool {
        self.supplied.contains(property)
    }

    // blank input unsupplies a property, also after an earlier value, so required fields report it as missing
    fn mark(&mut self, property: &'static str, raw: &str) -> &mut Self {
        if raw.trim().is_empty() {
            self.supplied.remove(property);
        } else {
            self.supplied.insert(property);
        }
        self
    }

    fn freeze(self) -> ConnectorConfig {
        let config = ConnectorConfig {
            nodes: self.nodes,
            connect_timeout: self.connect_timeout,
            buffer_size: self.buffer_size,
            default_schema: self.default_schema,
            table_names: self.table_names,
            table_description_dir: self.table_description_dir,
            hide_internal_columns: self.hide_internal_columns,
            security_protocol: self.security_protocol,
            sasl_mechanism: self.sasl_mechanism,
            sasl_kerberos_service_name: self.sasl_kerberos_service_name,
            kerberos_on: self.kerberos_on,
            login_config: self.login_config,
            krb5_conf: self.krb5_conf,
            group_id: self.group_id,
            user_password_auth_on: self.user_password_auth_on,
        };

        info!(
            nodes = %config.bootstrap_servers(),
            tables = config.table_names.len(),
            connect_timeout = %humantime::format_duration(config.connect_timeout),
            buffer_size = %config.buffer_size,
            "Connector configuration validated"
        );

        config
    }

    #[cfg(test)]
    pub(crate) fn without_supplied(mut self) -> Self {
        self.supplied.clear();
        self
    }
}

/// Validated, read-only connector settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorConfig {
    #[serde(rename = "kafka.nodes")]
    nodes: BTreeSet<HostAddress>,
    #[serde(rename = "kafka.connect-timeout", with = "humantime_serde")]
    connect_timeout: Duration,
    #[serde(rename = "kafka.buffer-size")]
    buffer_size: DataSize,
    #[serde(rename = "kafka.default-schema")]
    default_schema: String,
    #[serde(rename = "kafka.table-names")]
    table_names: BTreeSet<String>,
    #[serde(rename = "kafka.table-description-dir")]
    table_description_dir: PathBuf,
    #[serde(rename = "kafka.hide-internal-columns")]
    hide_internal_columns: bool,
    #[serde(rename = "security.protocol")]
    security_protocol: Option<String>,
    #[serde(rename = "sasl.mechanism")]
    sasl_mechanism: Option<String>,
    #[serde(rename = "sasl.kerberos.service.name")]
    sasl_kerberos_service_name: Option<String>,
    #[serde(rename = "kerberos.on")]
    kerberos_on: Option<String>,
    #[serde(rename = "sasl.jaas.config")]
    login_config: Option<Secret>,
    #[serde(rename = "java.security.krb5.conf")]
    krb5_conf: Option<String>,
    #[serde(rename = "group.id")]
    group_id: Option<String>,
    #[serde(rename = "user.password.auth.on")]
    user_password_auth_on: Option<String>,
}

impl ConnectorConfig {
    pub const NODES: &'static str = "kafka.nodes";
    pub const CONNECT_TIMEOUT: &'static str = "kafka.connect-timeout";
    pub const BUFFER_SIZE: &'static str = "kafka.buffer-size";
    pub const DEFAULT_SCHEMA: &'static str = "kafka.default-schema";
    pub const TABLE_NAMES: &'static str = "kafka.table-names";
    pub const TABLE_DESCRIPTION_DIR: &'static str = "kafka.table-description-dir";
    pub const HIDE_INTERNAL_COLUMNS: &'static str = "kafka.hide-internal-columns";
    pub const SECURITY_PROTOCOL: &'static str = "security.protocol";
    pub const SASL_MECHANISM: &'static str = "sasl.mechanism";
    pub const SASL_KERBEROS_SERVICE_NAME: &'static str = "sasl.kerberos.service.name";
    pub const KERBEROS_ON: &'static str = "kerberos.on";
    pub const LOGIN_CONFIG: &'static str = "sasl.jaas.config";
    pub const KRB5_CONF: &'static str = "java.security.krb5.conf";
    pub const GROUP_ID: &'static str = "group.id";
    pub const USER_PASSWORD_AUTH_ON: &'static str = "user.password.auth.on";

    pub fn builder() -> ConnectorConfigBuilder {
        ConnectorConfigBuilder::default()
    }

    /// Applies every `(name, raw value)` pair and validates the result.
    ///
    /// All parse failures, unknown names and constraint violations are
    /// collected before giving up. A property whose value failed to parse is
    /// not reported a second time as missing.
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self, LoadErrors>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = ConnectorConfigBuilder::default();
        let mut errors = Vec::new();
        let mut unparsed = BTreeSet::new();

        for (name, raw) in properties {
            match builder.apply(name.as_ref(), raw.as_ref()) {
                Ok(_) => {}
                Err(ConfigError::Parse(err)) => {
                    unparsed.insert(err.property);
                    errors.push(ConfigError::Parse(err));
                }
                Err(err) => errors.push(err),
            }
        }

        errors.extend(
            properties::check_all(&builder, &unparsed)
                .into_iter()
                .map(ConfigError::from),
        );

        if errors.is_empty() {
            Ok(builder.freeze())
        } else {
            Err(LoadErrors(errors))
        }
    }

    pub fn nodes(&self) -> &BTreeSet<HostAddress> {
        &self.nodes
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn buffer_size(&self) -> DataSize {
        self.buffer_size
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    pub fn table_names(&self) -> &BTreeSet<String> {
        &self.table_names
    }

    pub fn table_description_dir(&self) -> &Path {
        &self.table_description_dir
    }

    pub fn hide_internal_columns(&self) -> bool {
        self.hide_internal_columns
    }

    pub fn security_protocol(&self) -> Option<&str> {
        self.security_protocol.as_deref()
    }

    pub fn sasl_mechanism(&self) -> Option<&str> {
        self.sasl_mechanism.as_deref()
    }

    pub fn sasl_kerberos_service_name(&self) -> Option<&str> {
        self.sasl_kerberos_service_name.as_deref()
    }

    pub fn kerberos_on(&self) -> Option<&str> {
        self.kerberos_on.as_deref()
    }

    pub fn login_config(&self) -> Option<&str> {
        self.login_config.as_ref().map(Secret::expose)
    }

    pub fn krb5_conf(&self) -> Option<&str> {
        self.krb5_conf.as_deref()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn user_password_auth_on(&self) -> Option<&str> {
        self.user_password_auth_on.as_deref()
    }

    /// Nodes as `host:port,host:port`, sorted.
    pub fn bootstrap_servers(&self) -> String {
        self.nodes.iter().join(",")
    }

    fn pass_through(&self) -> [(&'static str, Option<&str>); 8] {
        [
            (Self::SECURITY_PROTOCOL, self.security_protocol()),
            (Self::SASL_MECHANISM, self.sasl_mechanism()),
            (Self::SASL_KERBEROS_SERVICE_NAME, self.sasl_kerberos_service_name()),
            (Self::LOGIN_CONFIG, self.login_config()),
            (Self::KRB5_CONF, self.krb5_conf()),
            (Self::GROUP_ID, self.group_id()),
            (Self::KERBEROS_ON, self.kerberos_on()),
            (Self::USER_PASSWORD_AUTH_ON, self.user_password_auth_on()),
        ]
    }

    /// The supplied value of a pass-through property, or its documented default.
    pub fn pass_through_or_default(&self, property: &str) -> Option<&str> {
        let (name, value) = self
            .pass_through()
            .into_iter()
            .find(|(name, _)| *name == property)?;

        value.or_else(|| properties::descriptor(name).and_then(|d| d.default_value))
    }

    /// Settings for the external connection and authentication code, keyed by
    /// property name. Values are handed over verbatim.
    pub fn client_properties(&self) -> BTreeMap<String, String> {
        let mut client = BTreeMap::from([(BOOTSTRAP_SERVERS.to_owned(), self.bootstrap_servers())]);

        for (name, _) in self.pass_through() {
            if let Some(value) = self.pass_through_or_default(name) {
                client.insert(name.to_owned(), value.to_owned());
            }
        }

        client
    }

    /// A client configuration carrying only the entries librdkafka understands.
    #[cfg(feature = "kafka")]
    pub fn to_client_config(&self) -> rdkafka::ClientConfig {
        let mut config = rdkafka::ClientConfig::new();

        for (key, value) in self.client_properties() {
            let forwarded = key == BOOTSTRAP_SERVERS
                || properties::PROPERTIES
                    .iter()
                    .any(|descriptor| descriptor.client && descriptor.name == key);
            if forwarded {
                config.set(key, value);
            }
        }

        config
    }
}
