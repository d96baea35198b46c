// src/handlers/weather.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::weather::{default_time_of_day, parse_time_of_day};
use crate::state::AppState;
use super::error::ApiError;
use super::params::parse_optional_date;

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub date: Option<String>,
    pub time: Option<String>,
}

pub async fn get_weather(query: WeatherQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get weather: {:?}", query);

    let date = parse_optional_date("date", query.date.as_deref())?.unwrap_or_else(|| state.today());
    let time = match query.time.as_deref() {
        Some(value) => parse_time_of_day(value).map_err(|e| warp::reject::custom(ApiError::validation(e)))?,
        None => default_time_of_day(),
    };

    let snapshot = state.weather.lookup(date, time).await.map_err(|e| {
        error!("Weather lookup for {} failed: {}", date, e);
        warp::reject::custom(ApiError::upstream("Weather data unavailable"))
    })?;

    Ok(warp::reply::json(&snapshot))
}
