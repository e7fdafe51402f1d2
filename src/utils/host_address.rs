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

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Serialize, Serializer};

/// A network endpoint of one cluster node.
///
/// IPv6 hosts are stored without brackets and rendered as `[addr]:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostAddress {
    host: String,
    port: u16,
}

impl HostAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Parses `host`, `host:port`, `[v6]`, `[v6]:port` or a bare IPv6 address.
    /// Tokens without a port get `default_port`.
    ///
    /// Only the syntax is checked, the host is never looked up.
    pub fn parse_with_default_port(s: &str, default_port: u16) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty host address".to_owned());
        }

        let (host, port) = match split_host_port(s)? {
            Split::Ipv6 { host, port } => (parse_ipv6(host)?, port),
            Split::Host { host, port } => (parse_host(host)?, port),
        };

        let port = match port {
            Some(port) => parse_port(port)?,
            None => default_port,
        };

        Ok(Self { host, port })
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl Serialize for HostAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

enum Split<'a> {
    Ipv6 { host: &'a str, port: Option<&'a str> },
    Host { host: &'a str, port: Option<&'a str> },
}

fn split_host_port(s: &str) -> Result<Split<'_>, String> {
    if let Some(rest) = s.strip_prefix('[') {
        let Some((host, tail)) = rest.split_once(']') else {
            return Err(format!("missing closing ']' in '{s}'"));
        };
        if tail.is_empty() {
            return Ok(Split::Ipv6 { host, port: None });
        }
        let Some(port) = tail.strip_prefix(':') else {
            return Err(format!("only a port may follow the bracketed host in '{s}'"));
        };
        return Ok(Split::Ipv6 {
            host,
            port: Some(port),
        });
    }

    match s.matches(':').count() {
        0 => Ok(Split::Host {
            host: s,
            port: None,
        }),
        1 => {
            let (host, port) = s.split_once(':').unwrap_or((s, ""));
            Ok(Split::Host {
                host,
                port: Some(port),
            })
        }
        // more than one colon without brackets can only be an IPv6 literal
        _ => Ok(Split::Ipv6 {
            host: s,
            port: None,
        }),
    }
}

fn parse_ipv6(host: &str) -> Result<String, String> {
    host.parse::<Ipv6Addr>()
        .map(|addr| addr.to_string())
        .map_err(|_| format!("'{host}' is not a valid IPv6 address"))
}

const MAX_HOST_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

// host text is kept as written apart from case, nothing is decoded or reinterpreted
fn parse_host(host: &str) -> Result<String, String> {
    if host.is_empty() {
        return Err("host name is missing".to_owned());
    }

    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Ok(addr.to_string());
    }

    if host.len() > MAX_HOST_NAME_LEN {
        return Err(format!("host name '{host}' is too long"));
    }

    for label in host.strip_suffix('.').unwrap_or(host).split('.') {
        check_label(host, label)?;
    }

    Ok(host.to_ascii_lowercase())
}

fn check_label(host: &str, label: &str) -> Result<(), String> {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return Err(format!("'{host}' is not a valid host: bad label length"));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("'{host}' is not a valid host: label '{label}' starts or ends with '-'"));
    }
    if let Some(c) = label
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(format!("'{host}' is not a valid host: unexpected character {c:?}"));
    }

    Ok(())
}

fn parse_port(port: &str) -> Result<u16, String> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("port '{port}' is not a number"));
    }

    port.parse()
        .map_err(|_| format!("port '{port}' is out of range"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::HostAddress;

    #[rstest]
    #[case("localhost", "localhost", 9092)]
    #[case("localhost:19092", "localhost", 19092)]
    #[case("  broker-1.example.com:9093 ", "broker-1.example.com", 9093)]
    #[case("Broker.Example.COM", "broker.example.com", 9092)]
    #[case("10.0.0.7:9094", "10.0.0.7", 9094)]
    #[case("[::1]:9095", "::1", 9095)]
    #[case("[fe80::1]", "fe80::1", 9092)]
    #[case("fe80::1", "fe80::1", 9092)]
    #[case("kafka.1", "kafka.1", 9092)]
    #[case("10.1", "10.1", 9092)]
    #[case("0x7f.1:9093", "0x7f.1", 9093)]
    #[case("4294967295", "4294967295", 9092)]
    #[case("kafka_broker.internal.", "kafka_broker.internal.", 9092)]
    fn parses_host_and_port(#[case] input: &str, #[case] host: &str, #[case] port: u16) {
        let address = HostAddress::parse_with_default_port(input, 9092).unwrap();
        assert_eq!(address.host(), host);
        assert_eq!(address.port(), port);
    }

    #[rstest]
    #[case("")]
    #[case(":9092")]
    #[case("broker:")]
    #[case("broker:port")]
    #[case("broker:70000")]
    #[case("broker:-1")]
    #[case("bro ker:9092")]
    #[case("[::1")]
    #[case("[::1]9092")]
    #[case("[not-v6]:9092")]
    #[case("fe80::zz")]
    #[case("broker%41")]
    #[case("-broker")]
    #[case("a..b")]
    #[case("bücher.example")]
    fn rejects_malformed_addresses(#[case] input: &str) {
        assert!(HostAddress::parse_with_default_port(input, 9092).is_err());
    }

    #[rstest]
    #[case("broker:9092")]
    #[case("[::1]:9093")]
    #[case("10.1.2.3:1")]
    fn display_parses_back(#[case] input: &str) {
        let address = HostAddress::parse_with_default_port(input, 9092).unwrap();
        let rendered = address.to_string();
        assert_eq!(rendered, input);
        assert_eq!(
            HostAddress::parse_with_default_port(&rendered, 1).unwrap(),
            address
        );
    }
}
