// src/services/store.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::RevenueRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Record store returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Could not decode record store response: {0}")]
    Decode(String),

    #[error("Invalid record: {0}")]
    Invalid(String),
}

/// Persistence for daily revenue rows, keyed by date.
#[async_trait]
pub trait RevenueStore: Send + Sync {
    /// Records with `from <= date <= to`, ascending by date. Missing bounds are open.
    async fn list_records(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RevenueRecord>, StoreError>;

    /// Creates the row for `record.date` or replaces every field of the existing one.
    async fn upsert_record(&self, record: RevenueRecord) -> Result<RevenueRecord, StoreError>;

    async fn count_records(&self) -> Result<usize, StoreError>;

    async fn get_record(&self, date: NaiveDate) -> Result<Option<RevenueRecord>, StoreError> {
        let mut records = self.list_records(Some(date), Some(date)).await?;
        Ok(records.pop())
    }
}

pub(crate) fn validate_record(record: &RevenueRecord) -> Result<(), StoreError> {
    record.totals.validate().map_err(StoreError::Invalid)
}

/// Process-local store, used when no hosted backend is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<BTreeMap<NaiveDate, RevenueRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = RevenueRecord>) -> Self {
        InMemoryStore {
            records: RwLock::new(records.into_iter().map(|r| (r.date, r)).collect()),
        }
    }
}

#[async_trait]
impl RevenueStore for InMemoryStore {
    async fn list_records(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RevenueRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| from.map_or(true, |f| r.date >= f))
            .filter(|r| to.map_or(true, |t| r.date <= t))
            .cloned()
            .collect())
    }

    async fn upsert_record(&self, record: RevenueRecord) -> Result<RevenueRecord, StoreError> {
        validate_record(&record)?;
        self.records.write().await.insert(record.date, record.clone());
        Ok(record)
    }

    async fn count_records(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
