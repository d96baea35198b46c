// src/handlers/health.rs
use log::{error, info};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::with_status;

use crate::state::AppState;

/// Reports whether the record store answers; never rejects.
pub async fn get_health(state: Arc<AppState>) -> Result<impl warp::Reply, Infallible> {
    info!("Handling health check");

    let (body, status) = match state.store.count_records().await {
        Ok(count) => (
            json!({ "store": { "ok": true, "count": count, "error": null } }),
            StatusCode::OK,
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                json!({ "store": { "ok": false, "count": null, "error": e.to_string() } }),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    };

    Ok(with_status(warp::reply::json(&body), status))
}
