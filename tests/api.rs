use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warp::http::StatusCode;

use venue_revenue_dashboard::routes::routes;
use venue_revenue_dashboard::services::store::InMemoryStore;
use venue_revenue_dashboard::services::weather::{
    FixedClock, HourlySample, Location, WeatherCache, WeatherError, WeatherService, WeatherSource,
};
use venue_revenue_dashboard::state::AppState;

struct ScriptedSource {
    code_at_noon: Option<i64>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn with_code(code: i64) -> Arc<Self> {
        Arc::new(ScriptedSource { code_at_noon: Some(code), calls: AtomicUsize::new(0) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(ScriptedSource { code_at_noon: None, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn fetch_hourly(
        &self,
        date: NaiveDate,
        _location: &Location,
    ) -> Result<Vec<HourlySample>, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let code = self
            .code_at_noon
            .ok_or_else(|| WeatherError::Unavailable("upstream down".to_string()))?;
        Ok((0..24)
            .map(|h| HourlySample {
                time: format!("{}T{:02}:00", date, h),
                temperature: Some(10.0 + h as f64 / 2.0),
                weather_code: Some(if h == 12 { code } else { 0 }),
            })
            .collect())
    }
}

struct Harness {
    state: Arc<AppState>,
    forecast: Arc<ScriptedSource>,
    archive: Arc<ScriptedSource>,
}

/// "Now" is 2025-02-01 09:00 UTC, 10:00 at the venue.
fn harness(forecast: Arc<ScriptedSource>, archive: Arc<ScriptedSource>) -> Harness {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()));
    let weather = WeatherService::new(
        forecast.clone(),
        archive.clone(),
        WeatherCache::new(Duration::hours(1)),
        clock.clone(),
        Location::default(),
        chrono_tz::Europe::Rome,
    );
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryStore::new()),
        weather,
        clock,
        chrono_tz::Europe::Rome,
    ));
    Harness { state, forecast, archive }
}

fn default_harness() -> Harness {
    harness(ScriptedSource::with_code(3), ScriptedSource::with_code(61))
}

async fn get(h: &Harness, path: &str) -> (StatusCode, Value) {
    let res = warp::test::request()
        .method("GET")
        .path(path)
        .reply(&routes(h.state.clone()))
        .await;
    let body = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
    (res.status(), body)
}

async fn post(h: &Harness, body: Value) -> (StatusCode, Value) {
    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/revenue")
        .json(&body)
        .reply(&routes(h.state.clone()))
        .await;
    let body = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
    (res.status(), body)
}

#[tokio::test]
async fn submit_creates_then_updates_one_record() {
    let h = default_harness();
    let payload = json!({"date": "2025-01-01", "totals": {"billiards": 10.0, "bar": 5.0}});

    let (status, body) = post(&h, payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "created");

    let (status, body) = post(&h, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "updated");

    let (status, body) = get(&h, "/api/v1/revenue?from=2025-01-01&to=2025-01-01").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["date"], "2025-01-01");
    assert_eq!(rows[0]["totals"]["billiards"], 10.0);
    assert_eq!(rows[0]["totals"]["bar"], 5.0);
    assert!(rows[0]["weather"].is_null());
}

#[tokio::test]
async fn list_projects_categories_and_honours_presets() {
    let h = default_harness();
    post(&h, json!({"date": "2025-01-20", "totals": {"bar": 5.0, "foosball": 2.0}})).await;
    post(&h, json!({"date": "2025-01-30", "totals": {"bar": 7.0, "video_games": 1.0}})).await;

    let (_, body) = get(&h, "/api/v1/revenue?preset=last7days&categories=bar").await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["date"], "2025-01-30");
    assert_eq!(rows[0]["totals"], json!({"bar": 7.0}));

    let (status, body) = get(&h, "/api/v1/revenue?categories=darts").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("darts"));
}

#[tokio::test]
async fn statistics_scenario() {
    let h = default_harness();
    post(&h, json!({"date": "2025-01-01", "totals": {"billiards": 10.0, "bar": 5.0}})).await;
    post(&h, json!({"date": "2025-01-02", "totals": {"billiards": 0.0, "bar": 20.0}})).await;

    let (status, body) = get(&h, "/api/v1/statistics?period=month&date=2025-01-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "month");
    assert_eq!(body["from"], "2025-01-01");
    assert_eq!(body["to"], "2025-01-31");
    assert_eq!(body["totals"]["billiards"], 10.0);
    assert_eq!(body["totals"]["bar"], 25.0);
    assert_eq!(body["best_performance"]["category"], "bar");
    assert_eq!(body["best_performance"]["total"], 25.0);
    assert_eq!(body["ranking"][0]["category"], "bar");
    assert_eq!(body["ranking"][1]["category"], "billiards");
    assert_eq!(body["trend"].as_array().unwrap().len(), 2);
    assert_eq!(body["grand_total"], 35.0);
}

#[tokio::test]
async fn statistics_for_empty_day_and_bad_period() {
    let h = default_harness();
    let (status, body) = get(&h, "/api/v1/statistics?period=day").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from"], "2025-02-01");
    assert_eq!(body["to"], "2025-02-01");
    assert!(body["best_performance"].is_null());
    assert_eq!(body["ranking"], json!([]));

    let (status, body) = get(&h, "/api/v1/statistics?period=fortnight").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn comparison_requires_all_bounds() {
    let h = default_harness();
    let (status, body) = get(&h, "/api/v1/comparison?a_from=2025-01-01&a_to=2025-01-31").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("b_from"));

    let (status, _) = get(
        &h,
        "/api/v1/comparison?a_from=2025-01-31&a_to=2025-01-01&b_from=2025-01-01&b_to=2025-01-02",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comparison_scenario() {
    let h = default_harness();
    post(&h, json!({"date": "2025-01-10", "totals": {"billiards": 100.0}})).await;
    post(&h, json!({"date": "2024-12-10", "totals": {"billiards": 50.0, "bar": 0.0}})).await;
    post(&h, json!({"date": "2025-01-11", "totals": {"bar": 30.0}})).await;

    let (status, body) = get(
        &h,
        "/api/v1/comparison?a_from=2025-01-01&a_to=2025-01-31&b_from=2024-12-01&b_to=2024-12-31&a_label=January",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period_a"]["label"], "January");
    assert_eq!(body["period_b"]["label"], "Period B");
    assert_eq!(body["period_a"]["total"], 130.0);
    assert_eq!(body["period_b"]["total"], 50.0);

    let billiards = &body["per_category"][0];
    assert_eq!(billiards["category"], "billiards");
    assert_eq!(billiards["difference"], 50.0);
    assert_eq!(billiards["percent_change"], 100.0);

    let bar = &body["per_category"][3];
    assert_eq!(bar["category"], "bar");
    assert_eq!(bar["percent_change"], 0.0);
    assert_eq!(bar["no_baseline"], true);
}

#[tokio::test]
async fn weather_lookup_is_cached() {
    let h = default_harness();
    let (status, body) = get(&h, "/api/v1/weather?date=2025-01-10&time=12:30").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Slight Rain");
    assert_eq!(body["temperature"], 16.0);

    let (status, _) = get(&h, "/api/v1/weather?date=2025-01-10&time=12:30").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.archive.calls(), 1);
    assert_eq!(h.forecast.calls(), 0);

    let (status, body) = get(&h, "/api/v1/weather").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Overcast");
    assert_eq!(h.forecast.calls(), 1);
}

#[tokio::test]
async fn weather_errors() {
    let h = harness(ScriptedSource::failing(), ScriptedSource::failing());
    let (status, body) = get(&h, "/api/v1/weather?date=2025-01-10").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Weather data unavailable");

    let (status, _) = get(&h, "/api/v1/weather?time=25:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn weather_failure_does_not_block_submission() {
    let h = harness(ScriptedSource::failing(), ScriptedSource::failing());
    let (status, body) = post(
        &h,
        json!({"date": "2025-01-10", "totals": {"bar": 12.0}, "attach_weather": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["weather"].is_null());
    assert_eq!(h.archive.calls(), 1);
}

#[tokio::test]
async fn submission_can_attach_weather() {
    let h = default_harness();
    let (status, body) = post(
        &h,
        json!({"date": "2025-01-10", "totals": {"bar": 12.0}, "attach_weather": true, "weather_time": "12:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weather"]["description"], "Slight Rain");
}

#[tokio::test]
async fn invalid_submissions_are_rejected() {
    let h = default_harness();
    let (status, body) = post(&h, json!({"date": "2025-01-10", "totals": {"bar": -1.0}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("non-negative"));

    let (status, _) = post(&h, json!({"date": "yesterday", "totals": {}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&h, "/api/v1/revenue?from=01/02/2025").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_and_health() {
    let h = default_harness();
    post(&h, json!({"date": "2025-02-01", "totals": {"bowling_game": 40.0}})).await;
    post(&h, json!({"date": "2025-01-15", "totals": {"bowling_time": 60.0}})).await;

    let (status, body) = get(&h, "/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today"], "2025-02-01");
    assert_eq!(body["daily_total"], 40.0);
    assert_eq!(body["monthly_total"], 40.0);
    assert_eq!(body["yearly_total"], 100.0);
    assert_eq!(body["weekly_average"], 280.0);
    assert_eq!(body["recent"].as_array().unwrap().len(), 2);

    let (status, body) = get(&h, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["ok"], true);
    assert_eq!(body["store"]["count"], 2);
}

#[tokio::test]
async fn unknown_paths_are_json_404() {
    let h = default_harness();
    let (status, body) = get(&h, "/api/v1/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}
