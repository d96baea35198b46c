// src/services/weather.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::models::WeatherSnapshot;

const ICON_BASE: &str = "https://cdn.worldweatheronline.com/images/wsymbols01_png_64";

/// WMO weather interpretation codes: (code, description, icon file).
const WMO_CODES: &[(u8, &str, &str)] = &[
    (0, "Sunny", "wsymbol_0001_sunny.png"),
    (1, "Mainly Clear", "wsymbol_0002_sunny_intervals.png"),
    (2, "Partly Cloudy", "wsymbol_0002_sunny_intervals.png"),
    (3, "Overcast", "wsymbol_0004_black_low_cloud.png"),
    (45, "Fog", "wsymbol_0006_mist.png"),
    (48, "Depositing Rime Fog", "wsymbol_0006_mist.png"),
    (51, "Light Drizzle", "wsymbol_0009_light_rain_showers.png"),
    (53, "Moderate Drizzle", "wsymbol_0009_light_rain_showers.png"),
    (55, "Dense Drizzle", "wsymbol_0010_heavy_rain_showers.png"),
    (61, "Slight Rain", "wsymbol_0009_light_rain_showers.png"),
    (63, "Moderate Rain", "wsymbol_0010_heavy_rain_showers.png"),
    (65, "Heavy Rain", "wsymbol_0010_heavy_rain_showers.png"),
    (71, "Slight Snow", "wsymbol_0011_light_snow_showers.png"),
    (73, "Moderate Snow", "wsymbol_0012_heavy_snow_showers.png"),
    (75, "Heavy Snow", "wsymbol_0012_heavy_snow_showers.png"),
    (80, "Slight Rain Showers", "wsymbol_0009_light_rain_showers.png"),
    (81, "Moderate Rain Showers", "wsymbol_0010_heavy_rain_showers.png"),
    (82, "Violent Rain Showers", "wsymbol_0010_heavy_rain_showers.png"),
    (95, "Thunderstorm", "wsymbol_0024_thunderstorms.png"),
    (96, "Thunderstorm with Hail", "wsymbol_0024_thunderstorms.png"),
    (99, "Thunderstorm with Heavy Hail", "wsymbol_0024_thunderstorms.png"),
];

const UNKNOWN_ICON: &str = "wsymbol_0001_sunny.png";

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCondition {
    pub description: String,
    pub icon: String,
}

/// Unknown codes map to "Unknown" with the sunny icon.
pub fn describe_weather_code(code: i64) -> WeatherCondition {
    let (description, icon) = WMO_CODES
        .iter()
        .find(|(c, _, _)| i64::from(*c) == code)
        .map(|(_, description, icon)| (*description, *icon))
        .unwrap_or(("Unknown", UNKNOWN_ICON));
    WeatherCondition {
        description: description.to_string(),
        icon: format!("{}/{}", ICON_BASE, icon),
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Location {
            name: "Rome".to_string(),
            latitude: 41.9028,
            longitude: 12.4964,
        }
    }
}

/// One hour of an upstream series. `time` is the local ISO timestamp, e.g. `2025-12-28T12:00`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub time: String,
    pub temperature: Option<f64>,
    pub weather_code: Option<i64>,
}

impl HourlySample {
    fn is_complete(&self) -> bool {
        self.temperature.is_some() && self.weather_code.is_some()
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_hourly(
        &self,
        date: NaiveDate,
        location: &Location,
    ) -> Result<Vec<HourlySample>, WeatherError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now = *now + by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
}

#[derive(Debug, Clone)]
struct CachedWeather {
    snapshot: WeatherSnapshot,
    stored_at: DateTime<Utc>,
}

/// Lookup results kept for `ttl`. Expired entries are overwritten on the next miss.
#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CachedWeather>>,
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        WeatherCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<WeatherSnapshot> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|cached| now - cached.stored_at < self.ttl)
            .map(|cached| cached.snapshot.clone())
    }

    pub fn insert(&self, key: CacheKey, snapshot: WeatherSnapshot, now: DateTime<Utc>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, CachedWeather { snapshot, stored_at: now });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Past,
    Today,
    Future,
}

pub fn classify_date(date: NaiveDate, today: NaiveDate) -> DayKind {
    if date < today {
        DayKind::Past
    } else if date == today {
        DayKind::Today
    } else {
        DayKind::Future
    }
}

/// Parses `HH:MM` (seconds are not accepted).
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| format!("Invalid time '{}', expected HH:MM", value.trim()))
}

pub fn default_time_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// The sample for `hour`, else index 12, else index 0.
pub fn select_sample(samples: &[HourlySample], hour: u32) -> Option<&HourlySample> {
    let marker = format!("T{:02}:00", hour);
    samples
        .iter()
        .find(|s| s.time.contains(&marker))
        .filter(|s| s.is_complete())
        .or_else(|| samples.get(12).filter(|s| s.is_complete()))
        .or_else(|| samples.first().filter(|s| s.is_complete()))
}

/// Cached weather lookup for the venue location.
pub struct WeatherService {
    forecast: Arc<dyn WeatherSource>,
    archive: Arc<dyn WeatherSource>,
    cache: WeatherCache,
    clock: Arc<dyn Clock>,
    location: Location,
    timezone: Tz,
}

impl WeatherService {
    pub fn new(
        forecast: Arc<dyn WeatherSource>,
        archive: Arc<dyn WeatherSource>,
        cache: WeatherCache,
        clock: Arc<dyn Clock>,
        location: Location,
        timezone: Tz,
    ) -> Self {
        WeatherService {
            forecast,
            archive,
            cache,
            clock,
            location,
            timezone,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.timezone).date_naive()
    }

    pub async fn lookup(&self, date: NaiveDate, time: NaiveTime) -> Result<WeatherSnapshot, WeatherError> {
        // Minutes do not change the selected sample but stay part of the key.
        let time = time.with_second(0).unwrap_or(time);
        let key = CacheKey {
            date,
            time,
            location: self.location.name.clone(),
        };

        if let Some(snapshot) = self.cache.get(&key, self.clock.now()) {
            debug!("Returning cached weather data for {:?}", key);
            return Ok(snapshot);
        }

        let kind = classify_date(date, self.today());
        let source = match kind {
            DayKind::Future | DayKind::Today => &self.forecast,
            DayKind::Past => &self.archive,
        };
        info!(
            "Fetching {:?} weather for {} {} at {}",
            kind, date, time.format("%H:%M"), self.location.name
        );

        let samples = source.fetch_hourly(date, &self.location).await.map_err(|e| {
            error!("Error fetching weather data: {}", e);
            e
        })?;
        if samples.is_empty() {
            return Err(WeatherError::Unavailable("No hourly weather data in response".to_string()));
        }

        let sample = select_sample(&samples, time.hour())
            .ok_or_else(|| WeatherError::Unavailable("Incomplete weather data received".to_string()))?;
        let condition = sample
            .weather_code
            .map(describe_weather_code)
            .ok_or_else(|| WeatherError::Unavailable("Missing weather code".to_string()))?;

        let snapshot = WeatherSnapshot {
            temperature: sample.temperature.unwrap_or_default(),
            description: condition.description,
            icon: condition.icon,
        };
        self.cache.insert(key, snapshot.clone(), self.clock.now());
        Ok(snapshot)
    }
}
