// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::{
    comparison::get_comparison, dashboard::get_dashboard, health::get_health,
    revenue::{list_revenue, submit_revenue}, statistics::get_statistics, weather::get_weather,
};
use crate::state::AppState;
use log::{debug, info};

use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

const MAX_BODY_BYTES: u64 = 16 * 1024;

// Every rejection becomes `{"error": message}` with a matching status
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status();
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid request body: {}", e);
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload Too Large".to_string();
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = StatusCode::UNSUPPORTED_MEDIA_TYPE;
        message = "Unsupported Media Type".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }
    debug!("Rejected request with {}: {}", code, message);

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let list_revenue_route = warp::path!("api" / "v1" / "revenue")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(list_revenue);

    let submit_revenue_route = warp::path!("api" / "v1" / "revenue")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(submit_revenue);

    let statistics_route = warp::path!("api" / "v1" / "statistics")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(get_statistics);

    let comparison_route = warp::path!("api" / "v1" / "comparison")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(get_comparison);

    let weather_route = warp::path!("api" / "v1" / "weather")
        .and(warp::get())
        .and(warp::query())
        .and(state_filter.clone())
        .and_then(get_weather);

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_dashboard);

    let health_route = warp::path!("api" / "v1" / "health")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_health);

    info!("All routes configured successfully.");

    list_revenue_route
        .or(submit_revenue_route)
        .or(statistics_route)
        .or(comparison_route)
        .or(weather_route)
        .or(dashboard_route)
        .or(health_route)
        .recover(handle_rejection)
}
