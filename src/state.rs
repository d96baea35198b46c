// src/state.rs
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use log::info;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::open_meteo::OpenMeteoSource;
use crate::services::store::{InMemoryStore, RevenueStore};
use crate::services::supabase::SupabaseStore;
use crate::services::weather::{Clock, SystemClock, WeatherCache, WeatherService};

/// Everything a request handler needs.
pub struct AppState {
    pub store: Arc<dyn RevenueStore>,
    pub weather: WeatherService,
    pub clock: Arc<dyn Clock>,
    pub timezone: Tz,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RevenueStore>,
        weather: WeatherService,
        clock: Arc<dyn Clock>,
        timezone: Tz,
    ) -> Self {
        AppState { store, weather, clock, timezone }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let store: Arc<dyn RevenueStore> = match &config.supabase {
            Some(supabase) => {
                info!("Using hosted revenue table '{}' at {}", supabase.table, supabase.url);
                Arc::new(SupabaseStore::new(supabase.clone()))
            }
            None => Arc::new(InMemoryStore::new()),
        };

        let client = reqwest::Client::new();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let weather = WeatherService::new(
            Arc::new(OpenMeteoSource::new(client.clone(), config.forecast_url.clone())),
            Arc::new(OpenMeteoSource::new(client, config.archive_url.clone())),
            WeatherCache::new(Duration::seconds(config.weather_cache_ttl_secs)),
            clock.clone(),
            config.location.clone(),
            config.timezone,
        );

        AppState::new(store, weather, clock, config.timezone)
    }

    /// Current calendar date at the venue.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.timezone).date_naive()
    }
}
