// src/config.rs
use chrono_tz::Tz;
use log::warn;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::services::open_meteo::{ARCHIVE_URL, FORECAST_URL};
use crate::services::supabase::SupabaseConfig;
use crate::services::weather::Location;

/// One week; longer than any useful weather snapshot.
const MAX_WEATHER_CACHE_TTL_SECS: i64 = 604_800;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub supabase: Option<SupabaseConfig>,
    pub location: Location,
    pub timezone: Tz,
    pub weather_cache_ttl_secs: i64,
    pub forecast_url: String,
    pub archive_url: String,
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(_) => parse_var(&lookup, "PORT", "a port number", 3030u16)?,
            None => {
                warn!("$PORT not set, defaulting to 3030");
                3030
            }
        };

        let supabase = match (lookup("SUPABASE_URL"), lookup("SUPABASE_KEY")) {
            (Some(url), Some(api_key)) => Some(SupabaseConfig {
                url,
                api_key,
                table: lookup("REVENUE_TABLE").unwrap_or_else(|| "incassi".to_string()),
            }),
            _ => {
                warn!("SUPABASE_URL/SUPABASE_KEY not set, revenue is kept in memory only");
                None
            }
        };

        let defaults = Location::default();
        let location = Location {
            name: lookup("WEATHER_LOCATION").unwrap_or(defaults.name),
            latitude: parse_var(&lookup, "LATITUDE", "a latitude", defaults.latitude)?,
            longitude: parse_var(&lookup, "LONGITUDE", "a longitude", defaults.longitude)?,
        };

        let timezone = match lookup("VENUE_TIMEZONE") {
            Some(value) => value.trim().parse::<Tz>().map_err(|_| ConfigError::Invalid {
                name: "VENUE_TIMEZONE",
                expected: "an IANA timezone name",
                value,
            })?,
            None => chrono_tz::Europe::Rome,
        };

        let weather_cache_ttl_secs =
            parse_var(&lookup, "WEATHER_CACHE_TTL_SECS", "a number of seconds", 3600i64)?;
        if !(1..=MAX_WEATHER_CACHE_TTL_SECS).contains(&weather_cache_ttl_secs) {
            return Err(ConfigError::Invalid {
                name: "WEATHER_CACHE_TTL_SECS",
                expected: "between 1 and 604800 seconds",
                value: weather_cache_ttl_secs.to_string(),
            });
        }

        Ok(AppConfig {
            port,
            supabase,
            location,
            timezone,
            weather_cache_ttl_secs,
            forecast_url: lookup("OPEN_METEO_FORECAST_URL").unwrap_or_else(|| FORECAST_URL.to_string()),
            archive_url: lookup("OPEN_METEO_ARCHIVE_URL").unwrap_or_else(|| ARCHIVE_URL.to_string()),
        })
    }
}
