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

use std::collections::BTreeMap;
use std::env::{self as std_env, VarError};
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use toml::{Table, Value};
use tracing::{debug, warn};

use crate::connectors::kafka::properties::PROPERTIES;

/// Property name to raw value, before any parsing.
pub type RawProperties = BTreeMap<String, String>;

/// Catalog files name the connector they configure.
const CONNECTOR_NAME_KEY: &str = "connector.name";
const CONNECTOR_NAME: &str = "kafka";

/// Variables with this prefix configure the command line tool itself.
pub const TOOL_ENV_PREFIX: &str = "KAFKA_CONNECTOR_";
const PROPERTY_ENV_PREFIX: &str = "KAFKA_";

/// Reads a catalog file. `.toml` files are flattened to dotted keys, anything
/// else is read as a Java style properties file.
pub fn load_file(path: &Path) -> Result<RawProperties> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file `{}`", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let mut properties = if is_toml {
        parse_toml(&contents)
    } else {
        parse_properties(&contents)
    }
    .with_context(|| format!("Failed to parse config file `{}`", path.display()))?;

    if let Some(name) = properties.remove(CONNECTOR_NAME_KEY) {
        if name != CONNECTOR_NAME {
            bail!(
                "`{}` configures connector `{name}`, expected `{CONNECTOR_NAME}`",
                path.display()
            );
        }
    }

    debug!(
        path = %path.display(),
        properties = properties.len(),
        "Loaded connector config file"
    );

    Ok(properties)
}

pub fn parse_toml(contents: &str) -> Result<RawProperties> {
    let table: Table = contents.parse()?;
    let mut properties = RawProperties::new();
    flatten("", table, &mut properties)?;

    Ok(properties)
}

fn flatten(prefix: &str, table: Table, properties: &mut RawProperties) -> Result<()> {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Table(table) => flatten(&key, table, properties)?,
            Value::Array(values) => {
                let joined = values
                    .into_iter()
                    .map(|value| {
                        value_to_string(value)
                            .ok_or_else(|| anyhow!("`{key}` may only list plain values"))
                    })
                    .collect::<Result<Vec<_>>>()?
                    .join(",");
                properties.insert(key, joined);
            }
            value => {
                let value = value_to_string(value)
                    .ok_or_else(|| anyhow!("`{key}` has an unsupported value"))?;
                properties.insert(key, value);
            }
        }
    }

    Ok(())
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

/// Parses `key=value` and `key: value` lines. `#` and `!` start comments, a
/// trailing `\` continues the entry on the next line and `\` escapes the
/// character after it (`\t`, `\n`, `\uXXXX`, `\=`, ...).
pub fn parse_properties(contents: &str) -> Result<RawProperties> {
    let mut properties = RawProperties::new();
    let mut lines = contents.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let number = index + 1;
        let mut entry = line.trim_start().to_owned();
        if entry.is_empty() || entry.starts_with('#') || entry.starts_with('!') {
            continue;
        }

        while continues(&entry) {
            entry.pop();
            match lines.next() {
                Some((_, next)) => entry.push_str(next.trim_start()),
                None => break,
            }
        }

        let Some(split) = find_separator(&entry) else {
            bail!("line {number}: expected `key=value`, got `{}`", entry.trim());
        };
        let key = unescape(entry[..split].trim()).map_err(|err| anyhow!("line {number}: {err}"))?;
        if key.is_empty() {
            bail!("line {number}: missing property name");
        }
        let value =
            unescape(entry[split + 1..].trim()).map_err(|err| anyhow!("line {number}: {err}"))?;

        properties.insert(key, value);
    }

    Ok(properties)
}

/// An odd number of trailing backslashes joins the next line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn find_separator(entry: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, c) in entry.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' | ':' => return Some(index),
            _ => {}
        }
    }
    None
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => unescaped.push('\t'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('f') => unescaped.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("malformed escape `\\u{hex}`"))?;
                unescaped.push(decoded);
            }
            Some(other) => unescaped.push(other),
            None => {}
        }
    }

    Ok(unescaped)
}

/// Collects every connector property set through its environment variable.
pub fn env_overrides() -> Result<RawProperties> {
    let mut overrides = RawProperties::new();

    for descriptor in PROPERTIES.iter() {
        match std_env::var(descriptor.env) {
            Ok(value) => {
                debug!(
                    env = descriptor.env,
                    property = descriptor.name,
                    value = descriptor.shown(&value),
                    "Environment override"
                );
                overrides.insert(descriptor.name.to_owned(), value);
            }
            Err(VarError::NotPresent) => {}
            Err(VarError::NotUnicode(_)) => {
                bail!("Environment variable `{}` is not valid unicode", descriptor.env)
            }
        }
    }

    for key in std_env::vars_os().filter_map(|(key, _)| key.into_string().ok()) {
        if looks_like_property_env(&key) && !PROPERTIES.iter().any(|d| d.env == key) {
            warn!("Ignoring environment variable `{key}` because it names no connector property");
        }
    }

    Ok(overrides)
}

fn looks_like_property_env(key: &str) -> bool {
    key.starts_with(PROPERTY_ENV_PREFIX) && !key.starts_with(TOOL_ENV_PREFIX)
}

/// Merges the config file, the environment and explicit overrides, later
/// sources winning.
pub fn load(file: Option<&Path>, overrides: &[(String, String)]) -> Result<RawProperties> {
    let mut properties = match file {
        Some(path) => load_file(path)?,
        None => RawProperties::new(),
    };
    properties.extend(env_overrides()?);
    properties.extend(overrides.iter().cloned());

    Ok(properties)
}
