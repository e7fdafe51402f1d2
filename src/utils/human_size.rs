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

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use human_size::{Any, ParsingError, SpecificSize};
use serde::{Serialize, Serializer};

/// Units of a [`DataSize`]. Every step is a factor of 1024, so `kB`, `KB` and `KiB` mean the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataUnit {
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
    Terabyte,
    Petabyte,
}

impl DataUnit {
    pub const fn factor(self) -> u64 {
        match self {
            DataUnit::Byte => 1,
            DataUnit::Kilobyte => 1 << 10,
            DataUnit::Megabyte => 1 << 20,
            DataUnit::Gigabyte => 1 << 30,
            DataUnit::Terabyte => 1 << 40,
            DataUnit::Petabyte => 1 << 50,
        }
    }

    pub const fn unit_string(self) -> &'static str {
        match self {
            DataUnit::Byte => "B",
            DataUnit::Kilobyte => "kB",
            DataUnit::Megabyte => "MB",
            DataUnit::Gigabyte => "GB",
            DataUnit::Terabyte => "TB",
            DataUnit::Petabyte => "PB",
        }
    }

    /// Decimal and binary spellings of a multiple mean the same unit here.
    fn from_multiple(multiple: Any) -> Option<Self> {
        let unit = match multiple {
            Any::Byte => DataUnit::Byte,
            Any::Kilobyte | Any::Kibibyte => DataUnit::Kilobyte,
            Any::Megabyte | Any::Mebibyte => DataUnit::Megabyte,
            Any::Gigabyte | Any::Gigibyte => DataUnit::Gigabyte,
            Any::Terabyte | Any::Tebibyte => DataUnit::Terabyte,
            Any::Petabyte | Any::Pebibyte => DataUnit::Petabyte,
            _ => return None,
        };
        Some(unit)
    }
}

/// An amount of bytes as written by a human, e.g. `64kB` or `1.5 MB`.
///
/// Two sizes are equal when they describe the same number of bytes.
#[derive(Debug, Clone, Copy)]
pub struct DataSize {
    value: f64,
    unit: DataUnit,
}

impl DataSize {
    pub fn new(value: f64, unit: DataUnit) -> Self {
        Self { value, unit }
    }

    pub fn of_bytes(bytes: u64) -> Self {
        Self::new(bytes as f64, DataUnit::Byte)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> DataUnit {
        self.unit
    }

    pub fn to_bytes(&self) -> u64 {
        (self.value * self.unit.factor() as f64).round() as u64
    }
}

impl PartialEq for DataSize {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for DataSize {}

impl PartialOrd for DataSize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataSize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

// NOTE: a bare number is a byte count, e.g. "1234" is 1234 bytes.
impl FromStr for DataSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(bytes) = s.strip_suffix("Bytes") {
            let bytes = bytes
                .trim()
                .parse()
                .map_err(|_| format!("'{s}' is not a byte count"))?;
            return Ok(Self::of_bytes(bytes));
        } else if let Ok(bytes) = s.parse() {
            return Ok(Self::of_bytes(bytes));
        }

        let size = SpecificSize::<Any>::from_str(s).map_err(|err| match err {
            ParsingError::EmptyInput => "Could not parse given size".to_string(),
            err => format!("invalid size '{s}': {err}"),
        })?;
        let unit = DataUnit::from_multiple(size.multiple())
            .ok_or_else(|| format!("size '{s}' is too large"))?;

        if size.value() * unit.factor() as f64 > u64::MAX as f64 {
            return Err(format!("size '{s}' is too large"));
        }

        Ok(Self::new(size.value(), unit))
    }
}

impl fmt::Display for DataSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.unit_string())
    }
}

impl Serialize for DataSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
