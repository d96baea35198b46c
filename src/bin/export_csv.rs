// src/bin/export_csv.rs
use anyhow::anyhow;
use chrono::NaiveDate;
use csv::Writer;
use dotenv::dotenv;
use log::info;
use std::env;
use std::io;

use venue_revenue_dashboard::config::AppConfig;
use venue_revenue_dashboard::models::Category;
use venue_revenue_dashboard::services::store::RevenueStore;
use venue_revenue_dashboard::services::supabase::SupabaseStore;

fn parse_arg(value: Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    value
        .map(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|e| anyhow!("bad date '{}': {}", v, e)))
        .transpose()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = env::args().skip(1);
    let from = parse_arg(args.next())?;
    let to = parse_arg(args.next())?;

    let supabase = AppConfig::from_env()?
        .supabase
        .ok_or_else(|| anyhow!("SUPABASE_URL and SUPABASE_KEY are required for an export"))?;
    let store = SupabaseStore::new(supabase);
    let records = store.list_records(from, to).await?;
    info!("Exporting {} record(s)", records.len());

    let mut wtr = Writer::from_writer(io::stdout());
    let mut header = vec!["date".to_string()];
    header.extend(Category::ALL.iter().map(|c| c.as_str().to_string()));
    header.extend(["total", "weather_temperature", "weather_description"].map(String::from));
    wtr.write_record(&header)?;

    for record in &records {
        let mut row = vec![record.date.format("%Y-%m-%d").to_string()];
        row.extend(record.totals.iter().map(|(_, amount)| amount.to_string()));
        row.push(record.total().to_string());
        match &record.weather {
            Some(w) => {
                row.push(w.temperature.to_string());
                row.push(w.description.clone());
            }
            None => row.extend([String::new(), String::new()]),
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
