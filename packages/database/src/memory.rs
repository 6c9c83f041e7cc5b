//! In-process accident store.
//!
//! Records live in a map keyed by `accident_id`, so upserting the same
//! spreadsheet twice replaces rather than duplicates.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use traffic_accidents_database_models::{AccidentRecord, FilterDescriptor};

use crate::{AccidentStore, DbError};

/// An [`AccidentStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<i64, AccidentRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Whether `record` satisfies every part of `filter`.
///
/// The location key is compared against the police station name exactly.
/// Type and category filters compare storage strings exactly.
#[must_use]
pub fn matches(filter: &FilterDescriptor, record: &AccidentRecord) -> bool {
    record.pstation == filter.location_key()
        && filter
            .year_range()
            .is_none_or(|range| range.contains(record.date_time))
        && filter
            .date_range()
            .is_none_or(|range| range.contains(record.date_time))
        && filter
            .accident_type()
            .is_none_or(|t| record.accident_type == t)
        && filter
            .categories()
            .is_none_or(|categories| categories.contains(&record.category))
}

#[async_trait]
impl AccidentStore for MemoryStore {
    async fn upsert_batch(&self, records: &[AccidentRecord]) -> Result<u64, DbError> {
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.accident_id, record.clone());
        }
        Ok(records.len() as u64)
    }

    async fn find(&self, filter: &FilterDescriptor) -> Result<Vec<AccidentRecord>, DbError> {
        let map = self.records.read().await;
        let mut found: Vec<AccidentRecord> = map
            .values()
            .filter(|record| matches(filter, record))
            .cloned()
            .collect();
        found.sort_by_key(|record| record.date_time);
        Ok(found)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use traffic_accidents_filter::{RawFilterParams, compile_filter_for_year};

    use super::*;

    fn record(
        id: i64,
        station: &str,
        y: i32,
        m: u32,
        d: u32,
        kind: &str,
        cat: &str,
    ) -> AccidentRecord {
        AccidentRecord {
            accident_id: id,
            pdepartment: "PU za Grad Beograd".to_string(),
            pstation: station.to_string(),
            date_time: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            longitude: 20.4,
            latitude: 44.8,
            accident_type: kind.to_string(),
            category: cat.to_string(),
            description: None,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_batch(&[
                record(3, "Zemun", 2023, 5, 1, "Sa poginulim", "SN SA PEŠACIMA"),
                record(1, "Zemun", 2020, 1, 1, "Sa mat.stetom", "SN SA JEDNIM VOZILOM"),
                record(2, "Zemun", 2021, 3, 5, "Sa povredjenim", "SN SA PARKIRANIM VOZILIMA"),
                record(4, "Zemun", 2024, 12, 31, "Sa mat.stetom", "SN SA PEŠACIMA"),
                record(5, "Vračar", 2022, 7, 7, "Sa mat.stetom", "SN SA PEŠACIMA"),
            ])
            .await
            .unwrap();
        store
    }

    fn compile(params: RawFilterParams) -> FilterDescriptor {
        compile_filter_for_year(&params, 2025).unwrap()
    }

    fn ids(records: &[AccidentRecord]) -> Vec<i64> {
        records.iter().map(|r| r.accident_id).collect()
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let store = seeded().await;
        assert_eq!(store.len().await, 5);
        store
            .upsert_batch(&[record(1, "Zemun", 2020, 1, 2, "Sa poginulim", "x")])
            .await
            .unwrap();
        assert_eq!(store.len().await, 5);
    }

    #[tokio::test]
    async fn filters_by_station_in_date_order() {
        let store = seeded().await;
        let found = store
            .find(&compile(RawFilterParams {
                location_key: Some("Zemun".to_string()),
                ..RawFilterParams::default()
            }))
            .await
            .unwrap();
        assert_eq!(ids(&found), [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn year_range_includes_years_in_between() {
        let store = seeded().await;
        let found = store
            .find(&compile(RawFilterParams {
                location_key: Some("Zemun".to_string()),
                years: Some("2020,2023".to_string()),
                ..RawFilterParams::default()
            }))
            .await
            .unwrap();
        assert_eq!(ids(&found), [1, 2, 3]);
    }

    #[tokio::test]
    async fn end_date_includes_whole_day() {
        let store = seeded().await;
        let found = store
            .find(&compile(RawFilterParams {
                location_key: Some("Zemun".to_string()),
                start_date: Some("2023-05-01".to_string()),
                end_date: Some("2024-12-31".to_string()),
                ..RawFilterParams::default()
            }))
            .await
            .unwrap();
        assert_eq!(ids(&found), [3, 4]);
    }

    #[tokio::test]
    async fn filters_by_type_and_categories() {
        let store = seeded().await;
        let found = store
            .find(&compile(RawFilterParams {
                location_key: Some("Zemun".to_string()),
                accident_type: Some("materijalna".to_string()),
                categories: Some("pesaci,parkirana".to_string()),
                ..RawFilterParams::default()
            }))
            .await
            .unwrap();
        assert_eq!(ids(&found), [4]);
    }

    #[tokio::test]
    async fn unknown_code_matches_nothing() {
        let store = seeded().await;
        let filter = FilterDescriptor::new(
            "Zemun".to_string(),
            None,
            None,
            Some("bogus".to_string()),
            None,
        );
        assert!(store.find(&filter).await.unwrap().is_empty());
    }
}
