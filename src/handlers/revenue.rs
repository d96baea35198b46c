// src/handlers/revenue.rs
use chrono::NaiveDate;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::with_status;
use warp::Rejection;

use crate::models::{CategoryTotals, RevenueRecord, WeatherSnapshot};
use crate::services::periods::RangePreset;
use crate::services::store::StoreError;
use crate::services::weather::{default_time_of_day, parse_time_of_day};
use crate::state::AppState;
use super::error::ApiError;
use super::params::{parse_categories, parse_optional_date};

#[derive(Debug, Default, Deserialize)]
pub struct RevenueQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub preset: Option<String>,
    pub categories: Option<String>,
}

/// Form payload for one day.
#[derive(Debug, Deserialize)]
pub struct RevenueSubmission {
    pub date: NaiveDate,
    #[serde(default)]
    pub totals: CategoryTotals,
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
    /// Look the weather up when none was submitted.
    #[serde(default)]
    pub attach_weather: bool,
    #[serde(default)]
    pub weather_time: Option<String>,
}

fn store_rejection(e: StoreError) -> Rejection {
    match e {
        StoreError::Invalid(message) => warp::reject::custom(ApiError::validation(message)),
        other => {
            error!("Record store error: {}", other);
            warp::reject::custom(ApiError::upstream("Failed to access revenue records"))
        }
    }
}

pub async fn list_revenue(query: RevenueQuery, state: Arc<AppState>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to list revenue: {:?}", query);

    let (mut from, mut to) = match query.preset.as_deref() {
        Some(preset) => {
            let preset: RangePreset = preset
                .parse()
                .map_err(|e: String| warp::reject::custom(ApiError::validation(e)))?;
            let range = preset.range(state.today());
            (Some(range.from), Some(range.to))
        }
        None => (None, None),
    };
    // Explicit bounds win over the preset.
    if let Some(date) = parse_optional_date("from", query.from.as_deref())? {
        from = Some(date);
    }
    if let Some(date) = parse_optional_date("to", query.to.as_deref())? {
        to = Some(date);
    }
    let categories = query.categories.as_deref().map(parse_categories).transpose()?;

    let mut records = state.store.list_records(from, to).await.map_err(store_rejection)?;
    if let Some(categories) = categories.filter(|c| !c.is_empty()) {
        for record in records.iter_mut() {
            record.totals = record.totals.project(&categories);
        }
    }

    Ok(warp::reply::json(&json!({ "data": records })))
}

pub async fn submit_revenue(
    submission: RevenueSubmission,
    state: Arc<AppState>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling revenue submission for {}", submission.date);

    submission
        .totals
        .validate()
        .map_err(|e| warp::reject::custom(ApiError::validation(e)))?;
    let weather_time = match submission.weather_time.as_deref() {
        Some(value) => parse_time_of_day(value).map_err(|e| warp::reject::custom(ApiError::validation(e)))?,
        None => default_time_of_day(),
    };

    let mut weather = submission.weather;
    if weather.is_none() && submission.attach_weather {
        match state.weather.lookup(submission.date, weather_time).await {
            Ok(snapshot) => weather = Some(snapshot),
            Err(e) => warn!("Saving {} without weather: {}", submission.date, e),
        }
    }

    let existing = state.store.get_record(submission.date).await.map_err(store_rejection)?;
    let record = RevenueRecord {
        date: submission.date,
        totals: submission.totals,
        weather,
    };
    let stored = state.store.upsert_record(record).await.map_err(store_rejection)?;

    let message = if existing.is_some() { "updated" } else { "created" };
    info!("Revenue for {} {}", stored.date, message);
    Ok(with_status(
        warp::reply::json(&json!({ "data": stored, "message": message })),
        StatusCode::OK,
    ))
}
