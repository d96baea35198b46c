// src/handlers/comparison.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::comparison::{compare, LabeledRange};
use crate::state::AppState;
use super::error::ApiError;
use super::params::{ordered_range, require_date};

#[derive(Debug, Default, Deserialize)]
pub struct ComparisonQuery {
    pub a_from: Option<String>,
    pub a_to: Option<String>,
    pub b_from: Option<String>,
    pub b_to: Option<String>,
    pub a_label: Option<String>,
    pub b_label: Option<String>,
}

pub async fn get_comparison(query: ComparisonQuery, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to compare periods: {:?}", query);

    if query.a_from.is_none() || query.a_to.is_none() || query.b_from.is_none() || query.b_to.is_none() {
        return Err(warp::reject::custom(ApiError::validation(
            "Missing parameters: a_from, a_to, b_from, b_to",
        )));
    }
    let a = LabeledRange::new(
        query.a_label.unwrap_or_else(|| "Period A".to_string()),
        ordered_range(
            require_date("a_from", query.a_from.as_deref())?,
            require_date("a_to", query.a_to.as_deref())?,
        )?,
    );
    let b = LabeledRange::new(
        query.b_label.unwrap_or_else(|| "Period B".to_string()),
        ordered_range(
            require_date("b_from", query.b_from.as_deref())?,
            require_date("b_to", query.b_to.as_deref())?,
        )?,
    );

    let (records_a, records_b) = tokio::try_join!(
        state.store.list_records(Some(a.range.from), Some(a.range.to)),
        state.store.list_records(Some(b.range.from), Some(b.range.to)),
    )
    .map_err(|e| {
        error!("Failed to load records for comparison: {}", e);
        warp::reject::custom(ApiError::upstream("Failed to load revenue records"))
    })?;

    Ok(warp::reply::json(&compare(&a, &records_a, &b, &records_b)))
}
