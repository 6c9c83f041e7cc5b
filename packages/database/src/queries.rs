//! Timed store operations.
//!
//! Handlers never call an [`AccidentStore`] directly; they go through these
//! functions so every call is bounded by a timeout.

use std::future::Future;
use std::time::Duration;

use traffic_accidents_database_models::{AccidentRecord, FilterDescriptor};

use crate::{AccidentStore, DbError, HEALTH_CHECK_TIMEOUT, StoreConfig};

/// Runs `future`, failing with [`DbError::Timeout`] if it does not finish
/// within `timeout`.
///
/// # Errors
///
/// Returns [`DbError::Timeout`] on timeout, or the future's own error.
pub async fn with_timeout<T, F>(future: F, timeout: Duration) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>> + Send,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| DbError::Timeout {
            timeout_ms: timeout.as_millis(),
        })?
}

/// Fetches the records matching `filter`, bounded by the configured query
/// timeout.
///
/// # Errors
///
/// Returns [`DbError::Timeout`] if the query exceeds
/// [`StoreConfig::query_timeout`], or [`DbError::Store`] if it fails.
pub async fn find_accidents(
    store: &dyn AccidentStore,
    filter: &FilterDescriptor,
    config: &StoreConfig,
) -> Result<Vec<AccidentRecord>, DbError> {
    let records = with_timeout(store.find(filter), config.query_timeout).await?;
    log::debug!(
        "Found {} accidents for {:?}",
        records.len(),
        filter.location_key()
    );
    Ok(records)
}

/// Probes the store, bounded by [`HEALTH_CHECK_TIMEOUT`].
///
/// # Errors
///
/// Returns [`DbError`] if the store is unreachable or slow to respond.
pub async fn check_connection(store: &dyn AccidentStore) -> Result<(), DbError> {
    with_timeout(store.ping(), HEALTH_CHECK_TIMEOUT).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct SlowStore;

    #[async_trait]
    impl AccidentStore for SlowStore {
        async fn upsert_batch(&self, records: &[AccidentRecord]) -> Result<u64, DbError> {
            Ok(records.len() as u64)
        }

        async fn find(&self, _filter: &FilterDescriptor) -> Result<Vec<AccidentRecord>, DbError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn ping(&self) -> Result<(), DbError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl AccidentStore for BrokenStore {
        async fn upsert_batch(&self, _records: &[AccidentRecord]) -> Result<u64, DbError> {
            Err(DbError::Store {
                message: "read-only".to_string(),
            })
        }

        async fn find(&self, _filter: &FilterDescriptor) -> Result<Vec<AccidentRecord>, DbError> {
            Err(DbError::Store {
                message: "connection reset".to_string(),
            })
        }

        async fn ping(&self) -> Result<(), DbError> {
            Ok(())
        }
    }

    fn filter() -> FilterDescriptor {
        FilterDescriptor::new("Zemun".to_string(), None, None, None, None)
    }

    #[tokio::test(start_paused = true)]
    async fn slow_query_times_out() {
        let config = StoreConfig::with_timeout_ms(Some(250));
        let err = find_accidents(&SlowStore, &filter(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Timeout { timeout_ms: 250 }));
        assert_eq!(err.to_string(), "Query timeout after 250ms");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_ping_times_out() {
        let err = check_connection(&SlowStore).await.unwrap_err();
        assert!(matches!(err, DbError::Timeout { timeout_ms: 5000 }));
    }

    #[tokio::test]
    async fn store_errors_are_not_timeouts() {
        let err = find_accidents(&BrokenStore, &filter(), &StoreConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Store { .. }));
        assert!(check_connection(&BrokenStore).await.is_ok());
    }

    #[test]
    fn default_timeout_applies_when_unset() {
        assert_eq!(
            StoreConfig::with_timeout_ms(None).query_timeout,
            Duration::from_secs(30)
        );
        assert_eq!(
            StoreConfig::with_timeout_ms(Some(1500)).query_timeout,
            Duration::from_millis(1500)
        );
    }
}
