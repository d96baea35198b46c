// src/handlers/statistics.rs
use log::{debug, error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::calculations::period_statistics;
use crate::services::periods::{period_bounds, Period};
use crate::state::AppState;
use super::error::ApiError;
use super::params::parse_optional_date;

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    pub period: Option<String>,
    pub date: Option<String>,
}

pub async fn get_statistics(query: StatisticsQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get statistics: {:?}", query);

    let period = match query.period.as_deref() {
        Some(p) => p
            .parse::<Period>()
            .map_err(|e| warp::reject::custom(ApiError::validation(e)))?,
        None => Period::default(),
    };
    let reference = parse_optional_date("date", query.date.as_deref())?
        .unwrap_or_else(|| state.today());

    let range = period_bounds(period, reference);
    debug!("Statistics range for {} around {}: {} to {}", period, reference, range.from, range.to);

    let records = state
        .store
        .list_records(Some(range.from), Some(range.to))
        .await
        .map_err(|e| {
            error!("Failed to load records for statistics: {}", e);
            warp::reject::custom(ApiError::upstream("Internal Server Error"))
        })?;

    let stats = period_statistics(&records, period, reference, range);
    Ok(warp::reply::json(&stats))
}
