#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Storage interface for accident records.
//!
//! The [`AccidentStore`] trait is the boundary between the query core and
//! whatever persists the records. The core hands it a validated
//! [`FilterDescriptor`] and gets matching records back; the functions in
//! [`queries`] impose the configured timeout on every call and classify
//! timeouts separately from other failures. [`memory::MemoryStore`] is the
//! bundled implementation.

pub mod memory;
pub mod queries;

use std::time::Duration;

use async_trait::async_trait;
use traffic_accidents_database_models::{AccidentRecord, FilterDescriptor};

/// Timeout applied to record queries when none is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to the connectivity probe.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The operation did not finish within its timeout.
    #[error("Query timeout after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u128,
    },

    /// The store failed to execute the operation.
    #[error("Store error: {message}")]
    Store {
        /// Description of what went wrong.
        message: String,
    },
}

/// Store access settings, fixed when the store handle is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on how long a record query may take.
    pub query_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Creates a config with the given query timeout in milliseconds,
    /// falling back to [`DEFAULT_QUERY_TIMEOUT`] when `None`.
    #[must_use]
    pub fn with_timeout_ms(timeout_ms: Option<u64>) -> Self {
        timeout_ms.map_or_else(Self::default, |ms| Self {
            query_timeout: Duration::from_millis(ms),
        })
    }
}

/// A persistent collection of accident records.
#[async_trait]
pub trait AccidentStore: Send + Sync {
    /// Inserts or replaces records keyed by `accident_id`, returning how
    /// many records were written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    async fn upsert_batch(&self, records: &[AccidentRecord]) -> Result<u64, DbError>;

    /// Returns every record matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    async fn find(&self, filter: &FilterDescriptor) -> Result<Vec<AccidentRecord>, DbError>;

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be reached.
    async fn ping(&self) -> Result<(), DbError>;
}
