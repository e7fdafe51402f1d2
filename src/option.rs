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

pub mod validation {
    use std::{
        collections::BTreeSet,
        path::PathBuf,
        time::Duration,
    };

    use crate::connectors::kafka::config::KAFKA_DEFAULT_PORT;
    use crate::utils::{host_address::HostAddress, human_size::DataSize};

    /// Splits on `,`, trims every token and drops the empty ones.
    pub fn split_list(s: &str) -> impl Iterator<Item = &str> {
        s.split(',').map(str::trim).filter(|token| !token.is_empty())
    }

    pub fn string_set(s: &str) -> BTreeSet<String> {
        split_list(s).map(str::to_owned).collect()
    }

    pub fn host_list(s: &str, default_port: u16) -> Result<BTreeSet<HostAddress>, String> {
        split_list(s)
            .map(|token| HostAddress::parse_with_default_port(token, default_port))
            .collect()
    }

    pub fn kafka_nodes(s: &str) -> Result<BTreeSet<HostAddress>, String> {
        host_list(s, KAFKA_DEFAULT_PORT)
    }

    pub fn duration(s: &str) -> Result<Duration, String> {
        humantime::parse_duration(s.trim()).map_err(|err| err.to_string())
    }

    pub fn data_size(s: &str) -> Result<DataSize, String> {
        s.parse()
    }

    pub fn boolean(s: &str) -> Result<bool, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err("expected 'true' or 'false'".to_owned()),
        }
    }

    pub fn file_path(s: &str) -> Result<PathBuf, String> {
        if s.is_empty() {
            return Err("empty path".to_owned());
        }

        let path = PathBuf::from(s);

        if !path.is_file() {
            return Err("path specified does not point to an accessible file".to_string());
        }

        Ok(path)
    }

    pub fn key_value(s: &str) -> Result<(String, String), String> {
        let Some((key, value)) = s.split_once('=') else {
            return Err(format!("expected KEY=VALUE, got '{s}'"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing property name in '{s}'"));
        }

        Ok((key.to_owned(), value.trim().to_owned()))
    }

    #[cfg(test)]
    mod tests {
        use std::time::Duration;

        use maplit::btreeset;
        use rstest::rstest;

        use super::*;

        #[rstest]
        #[case("a, b ,b,c", btreeset! {"a", "b", "c"})]
        #[case(" , ,, ", btreeset! {})]
        #[case("", btreeset! {})]
        #[case("orders", btreeset! {"orders"})]
        fn string_set_trims_and_deduplicates(
            #[case] input: &str,
            #[case] expected: std::collections::BTreeSet<&str>,
        ) {
            let actual = string_set(input);
            assert_eq!(
                actual.iter().map(String::as_str).collect::<std::collections::BTreeSet<_>>(),
                expected
            );
        }

        #[test]
        fn host_list_ignores_order_whitespace_and_duplicates() {
            let first = kafka_nodes("b:9093, a ,a:9092,,").unwrap();
            let second = kafka_nodes("a:9092,b:9093").unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), 2);
        }

        #[test]
        fn host_list_reports_bad_token() {
            let err = kafka_nodes("good:9092,bad:port").unwrap_err();
            assert!(err.contains("port"), "{err}");
        }

        #[rstest]
        #[case("10s", Duration::from_secs(10))]
        #[case(" 500ms ", Duration::from_millis(500))]
        #[case("1m 30s", Duration::from_secs(90))]
        fn parses_durations(#[case] input: &str, #[case] expected: Duration) {
            assert_eq!(duration(input), Ok(expected));
        }

        #[rstest]
        #[case("")]
        #[case("ten seconds")]
        #[case("10")]
        fn rejects_malformed_durations(#[case] input: &str) {
            assert!(duration(input).is_err());
        }

        #[rstest]
        #[case("true", true)]
        #[case("FALSE", false)]
        #[case(" True ", true)]
        fn parses_booleans(#[case] input: &str, #[case] expected: bool) {
            assert_eq!(boolean(input), Ok(expected));
        }

        #[test]
        fn rejects_non_boolean() {
            assert!(boolean("yes").is_err());
        }

        #[test]
        fn key_value_splits_on_first_equals() {
            assert_eq!(
                key_value("sasl.jaas.config=a=b"),
                Ok(("sasl.jaas.config".to_owned(), "a=b".to_owned()))
            );
            assert!(key_value("kafka.nodes").is_err());
            assert!(key_value("=x").is_err());
        }

        #[test]
        fn file_path_must_exist() {
            let file = tempfile::NamedTempFile::new().unwrap();
            assert_eq!(file_path(file.path().to_str().unwrap()), Ok(file.path().to_path_buf()));
            assert!(file_path("").is_err());
            assert!(file_path("/definitely/not/here").is_err());
        }
    }
}
