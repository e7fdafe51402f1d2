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

pub mod config;
pub mod error;
pub mod properties;

pub use config::{ConnectorConfig, ConnectorConfigBuilder, KAFKA_DEFAULT_PORT};
pub use error::{ConfigError, LoadErrors, ParseError, ValidationError, Violation};
pub use properties::{descriptor, Constraint, PropertyDescriptor, PROPERTIES};
