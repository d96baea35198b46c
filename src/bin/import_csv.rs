// src/bin/import_csv.rs
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use csv::Reader;
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use std::fs::File;

use venue_revenue_dashboard::config::AppConfig;
use venue_revenue_dashboard::models::{Category, CategoryTotals, RevenueRecord};
use venue_revenue_dashboard::services::store::RevenueStore;
use venue_revenue_dashboard::services::supabase::SupabaseStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: import_csv <file.csv>"))?;

    let config = AppConfig::from_env()?;
    let supabase = config
        .supabase
        .ok_or_else(|| anyhow!("SUPABASE_URL and SUPABASE_KEY are required for an import"))?;
    let store = SupabaseStore::new(supabase);

    let file = File::open(&path).with_context(|| format!("opening {}", path))?;
    let mut rdr = Reader::from_reader(file);

    // Column positions by header name; categories without a column import as 0
    let headers = rdr.headers()?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h.trim() == "date")
        .ok_or_else(|| anyhow!("No 'date' column in {}", path))?;
    let columns: Vec<(Category, usize)> = Category::ALL
        .iter()
        .filter_map(|c| headers.iter().position(|h| h.trim() == c.as_str()).map(|i| (*c, i)))
        .collect();
    for category in Category::ALL {
        if !columns.iter().any(|(c, _)| *c == category) {
            warn!("No '{}' column, importing it as 0", category);
        }
    }

    let mut imported = 0;
    for result in rdr.records() {
        let row = result?;
        let date_cell = row.get(date_idx).unwrap_or("").trim();
        let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d")
            .with_context(|| format!("bad date '{}'", date_cell))?;

        let mut totals = CategoryTotals::new();
        for (category, idx) in &columns {
            let amount = match row.get(*idx).map(str::trim) {
                None | Some("") => 0.0,
                Some(val) => val
                    .parse::<f64>()
                    .with_context(|| format!("bad {} amount '{}' on {}", category, val, date))?,
            };
            totals.set(*category, amount);
        }

        store.upsert_record(RevenueRecord::new(date, totals)).await?;
        imported += 1;
    }

    info!("Imported {} day(s) from {}", imported, path);
    println!("Import complete: {} day(s)", imported);
    Ok(())
}
