// src/handlers/dashboard.rs
use log::{error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::dashboard::load_summary;
use crate::state::AppState;
use super::error::ApiError;

pub async fn get_dashboard(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get dashboard summary");

    match load_summary(state.store.as_ref(), state.today()).await {
        Ok(summary) => Ok(warp::reply::json(&summary)),
        Err(e) => {
            error!("Failed to load dashboard data: {}", e);
            Err(warp::reject::custom(ApiError::upstream("Failed to load dashboard data")))
        }
    }
}
