// src/services/dashboard.rs
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use serde::Serialize;

use crate::models::{DateRange, RevenueRecord};
use super::calculations::{aggregate, TrendPoint};
use super::periods::{period_bounds, Period};
use super::store::{RevenueStore, StoreError};

/// Headline figures for the landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub daily_total: f64,
    pub monthly_total: f64,
    pub yearly_total: f64,
    /// Month-to-date revenue scaled to seven days.
    pub weekly_average: f64,
    pub recent: Vec<TrendPoint>,
}

fn total_in(records: &[RevenueRecord], range: DateRange) -> f64 {
    records
        .iter()
        .filter(|r| range.contains(r.date))
        .map(RevenueRecord::total)
        .sum()
}

pub fn summarize(records: &[RevenueRecord], today: NaiveDate) -> DashboardSummary {
    let month = period_bounds(Period::Month, today);
    let year = period_bounds(Period::Year, today);
    let recent = DateRange::new(today - Duration::days(30), today);

    let monthly_total = total_in(records, month);
    let days_elapsed = today.day() as f64;

    DashboardSummary {
        today,
        daily_total: total_in(records, DateRange::single(today)),
        monthly_total,
        yearly_total: total_in(records, year),
        weekly_average: monthly_total * 7.0 / days_elapsed,
        recent: aggregate(records, recent).trend,
    }
}

/// Loads everything the summary needs in a single query.
pub async fn load_summary(
    store: &dyn RevenueStore,
    today: NaiveDate,
) -> Result<DashboardSummary, StoreError> {
    let year = period_bounds(Period::Year, today);
    let from = year.from.min(today - Duration::days(30));
    let records = store.list_records(Some(from), Some(today)).await?;
    info!("Building dashboard summary for {} from {} record(s)", today, records.len());
    Ok(summarize(&records, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::services::store::InMemoryStore;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bar(date: &str, amount: f64) -> RevenueRecord {
        RevenueRecord::new(d(date), vec![(Category::Bar, amount)].into_iter().collect())
    }

    #[test]
    fn summary_figures() {
        let records = vec![
            bar("2024-12-20", 1000.0),
            bar("2025-01-15", 50.0),
            bar("2025-02-01", 20.0),
            bar("2025-02-07", 50.0),
        ];
        let summary = summarize(&records, d("2025-02-07"));

        assert_eq!(summary.daily_total, 50.0);
        assert_eq!(summary.monthly_total, 70.0);
        assert_eq!(summary.yearly_total, 120.0);
        assert_eq!(summary.weekly_average, 70.0);
        // 2025-01-08 ..= 2025-02-07
        assert_eq!(summary.recent.len(), 3);
    }

    #[tokio::test]
    async fn loads_across_year_boundary() {
        let store = InMemoryStore::with_records(vec![bar("2024-12-20", 10.0), bar("2025-01-02", 5.0)]);
        let summary = load_summary(&store, d("2025-01-02")).await.unwrap();
        assert_eq!(summary.yearly_total, 5.0);
        assert_eq!(summary.recent.len(), 2);
        assert_eq!(summary.recent[0].date, d("2024-12-20"));
    }
}
