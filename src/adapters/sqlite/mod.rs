//! SQLite adapters for durable state.

pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::{create_pool, create_test_pool, ConnectionError};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use store::SqliteProgressStore;

use chrono::{DateTime, Utc};

use crate::domain::errors::{DomainError, DomainResult};

/// Parse an RFC 3339 datetime string from a SQLite row field.
pub(crate) fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::Serialization(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional RFC 3339 datetime string from a SQLite row field.
pub(crate) fn parse_optional_datetime(s: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    s.map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| DomainError::Serialization(e.to_string()))
}
