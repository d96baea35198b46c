// src/services/open_meteo.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{error, info};
use reqwest::Client;
use serde::Deserialize;

use super::weather::{HourlySample, Location, WeatherError, WeatherSource};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/era5";

#[derive(Debug, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    hourly: Option<HourlySeries>,
}

impl HourlySeries {
    fn into_samples(self) -> Vec<HourlySample> {
        let HourlySeries { time, temperature_2m, weather_code } = self;
        time.into_iter()
            .enumerate()
            .map(|(i, time)| HourlySample {
                time,
                temperature: temperature_2m.get(i).copied().flatten(),
                weather_code: weather_code.get(i).copied().flatten(),
            })
            .collect()
    }
}

fn parse_response(body: &str) -> Result<Vec<HourlySample>, WeatherError> {
    let parsed: OpenMeteoResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::Unavailable(format!("Malformed weather response: {}", e)))?;

    if parsed.error {
        let reason = parsed.reason.unwrap_or_else(|| "Weather API Error".to_string());
        error!("Open-Meteo API error: {}", reason);
        return Err(WeatherError::Unavailable(reason));
    }

    match parsed.hourly {
        Some(series) if !series.time.is_empty() => Ok(series.into_samples()),
        _ => Err(WeatherError::Unavailable(
            "No hourly weather data found in response".to_string(),
        )),
    }
}

/// Hourly `temperature_2m` and `weather_code` for one day from an Open-Meteo endpoint.
/// The forecast and ERA5 archive APIs share the same query shape.
pub struct OpenMeteoSource {
    client: Client,
    base_url: String,
}

impl OpenMeteoSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        OpenMeteoSource {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn forecast(client: Client) -> Self {
        Self::new(client, FORECAST_URL)
    }

    pub fn archive(client: Client) -> Self {
        Self::new(client, ARCHIVE_URL)
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    async fn fetch_hourly(
        &self,
        date: NaiveDate,
        location: &Location,
    ) -> Result<Vec<HourlySample>, WeatherError> {
        let day = date.format("%Y-%m-%d").to_string();
        info!("Fetching hourly weather from {} for {}", self.base_url, day);

        // Error responses come back as 4xx with a JSON body carrying `reason`,
        // so the body is parsed regardless of status.
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("hourly", "temperature_2m,weather_code".to_string()),
                ("timezone", "auto".to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
            ])
            .send()
            .await?
            .text()
            .await?;

        parse_response(&body)
    }
}
