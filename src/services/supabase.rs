// src/services/supabase.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::{Category, CategoryTotals, RevenueRecord, WeatherSnapshot};
use super::store::{validate_record, RevenueStore, StoreError};

#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    pub api_key: String,
    pub table: String,
}

/// Column layout of the `incassi` table. Every column is always sent so that an
/// upsert replaces the whole row; `id` and `created_at` are left to the database.
#[derive(Debug, Serialize, Deserialize)]
struct RevenueRow {
    #[serde(rename = "data")]
    date: NaiveDate,
    #[serde(default, rename = "biliardi")]
    billiards: Option<f64>,
    #[serde(default)]
    bowling_time: Option<f64>,
    #[serde(default)]
    bowling_game: Option<f64>,
    #[serde(default)]
    bar: Option<f64>,
    #[serde(default, rename = "calcetto")]
    foosball: Option<f64>,
    #[serde(default)]
    video_games: Option<f64>,
    #[serde(default)]
    weather_temperature: Option<f64>,
    #[serde(default)]
    weather_description: Option<String>,
    #[serde(default)]
    weather_icon: Option<String>,
}

impl RevenueRow {
    fn column(&self, category: Category) -> Option<f64> {
        match category {
            Category::Billiards => self.billiards,
            Category::BowlingTime => self.bowling_time,
            Category::BowlingGame => self.bowling_game,
            Category::Bar => self.bar,
            Category::Foosball => self.foosball,
            Category::VideoGames => self.video_games,
        }
    }
}

impl From<&RevenueRecord> for RevenueRow {
    fn from(record: &RevenueRecord) -> Self {
        let t = &record.totals;
        let weather = record.weather.as_ref();
        RevenueRow {
            date: record.date,
            billiards: Some(t.get(Category::Billiards)),
            bowling_time: Some(t.get(Category::BowlingTime)),
            bowling_game: Some(t.get(Category::BowlingGame)),
            bar: Some(t.get(Category::Bar)),
            foosball: Some(t.get(Category::Foosball)),
            video_games: Some(t.get(Category::VideoGames)),
            weather_temperature: weather.map(|w| w.temperature),
            weather_description: weather.map(|w| w.description.clone()),
            weather_icon: weather.map(|w| w.icon.clone()),
        }
    }
}

impl From<RevenueRow> for RevenueRecord {
    fn from(row: RevenueRow) -> Self {
        let totals: CategoryTotals = Category::ALL
            .iter()
            .map(|&c| (c, row.column(c).unwrap_or(0.0)))
            .collect();
        // A row only carries weather when the description was filled in.
        let weather = row.weather_description.map(|description| WeatherSnapshot {
            temperature: row.weather_temperature.unwrap_or(0.0),
            description,
            icon: row.weather_icon.unwrap_or_default(),
        });
        RevenueRecord {
            date: row.date,
            totals,
            weather,
        }
    }
}

/// Key column of the revenue table.
const DATE_COLUMN: &str = "data";

/// Revenue table behind a hosted PostgREST endpoint.
pub struct SupabaseStore {
    pub config: SupabaseConfig,
    client: Client,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> Self {
        SupabaseStore {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

/// Total row count from a PostgREST `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range_total(header: &str) -> Option<usize> {
    header.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl RevenueStore for SupabaseStore {
    async fn list_records(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RevenueRecord>, StoreError> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", format!("{}.asc", DATE_COLUMN)),
        ];
        if let Some(from) = from {
            query.push((DATE_COLUMN, format!("gte.{}", from.format("%Y-%m-%d"))));
        }
        if let Some(to) = to {
            query.push((DATE_COLUMN, format!("lte.{}", to.format("%Y-%m-%d"))));
        }
        debug!("Listing revenue rows from {}: {:?}", self.config.table, query);

        let response = self
            .request(reqwest::Method::GET)
            .query(&query)
            .send()
            .await?;
        let rows: Vec<RevenueRow> = Self::check(response).await?.json().await?;

        info!("Fetched {} revenue row(s)", rows.len());
        Ok(rows.into_iter().map(RevenueRecord::from).collect())
    }

    async fn upsert_record(&self, record: RevenueRecord) -> Result<RevenueRecord, StoreError> {
        validate_record(&record)?;
        let row = RevenueRow::from(&record);

        let response = self
            .request(reqwest::Method::POST)
            .query(&[("on_conflict", DATE_COLUMN)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&vec![row])
            .send()
            .await?;
        let mut rows: Vec<RevenueRow> = Self::check(response).await?.json().await?;

        info!("Upserted revenue row for {}", record.date);
        rows.pop()
            .map(RevenueRecord::from)
            .ok_or_else(|| StoreError::Decode("upsert returned no rows".to_string()))
    }

    async fn count_records(&self) -> Result<usize, StoreError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", DATE_COLUMN), ("limit", "1")])
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = Self::check(response).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| StoreError::Decode("missing or malformed Content-Range".to_string()))
    }
}
