// src/bin/test_weather.rs
use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveTime};
use dotenv::dotenv;
use std::env;

use venue_revenue_dashboard::config::AppConfig;
use venue_revenue_dashboard::services::weather::{default_time_of_day, parse_time_of_day};
use venue_revenue_dashboard::state::AppState;

/// `[YYYY-MM-DD] [HH:MM]`, defaulting to today and the default time of day.
fn parse_args(
    mut args: impl Iterator<Item = String>,
    today: NaiveDate,
) -> anyhow::Result<(NaiveDate, NaiveTime)> {
    let date = match args.next() {
        Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("bad date '{}'", d))?,
        None => today,
    };
    let time = match args.next() {
        Some(t) => parse_time_of_day(&t).map_err(|e| anyhow!(e))?,
        None => default_time_of_day(),
    };
    Ok((date, time))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let state = AppState::from_config(&AppConfig::from_env()?);
    let (date, time) = parse_args(env::args().skip(1), state.today())?;

    println!("Location:    {:?}", state.weather.location());
    println!("Lookup:      {} {}", date, time.format("%H:%M"));
    println!("Weather:     {:?}", state.weather.lookup(date, time).await?);
    // Second call within the TTL is served from the cache
    println!("Cached:      {:?}", state.weather.lookup(date, time).await?);
    println!("Cache size:  {}", state.weather.cache().len());
    Ok(())
}
