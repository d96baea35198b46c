// src/services/calculations.rs
use serde::Serialize;
use chrono::NaiveDate;
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{Category, CategoryTotals, DateRange, RevenueRecord};
use super::periods::Period;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub category: Category,
    pub label: &'static str,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub total: f64,
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub totals: CategoryTotals,
    pub total: f64,
}

/// Totals, ranking and daily trend over one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregate {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub totals: CategoryTotals,
    pub grand_total: f64,
    pub ranking: Vec<RankingEntry>,
    pub best_performance: Option<RankingEntry>,
    pub trend: Vec<TrendPoint>,
    pub record_count: usize,
    pub daily_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStatistics {
    pub period: Period,
    pub reference_date: NaiveDate,
    #[serde(flatten)]
    pub aggregate: PeriodAggregate,
    pub shares: Vec<CategoryShare>,
}

fn calculate_average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Categories by descending total. The sort is stable, so ties keep
/// declaration order.
pub fn rank_categories(totals: &CategoryTotals) -> Vec<RankingEntry> {
    let mut ranking: Vec<RankingEntry> = totals
        .iter()
        .map(|(category, total)| RankingEntry {
            category,
            label: category.label(),
            total,
        })
        .collect();
    ranking.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    ranking
}

pub fn category_shares(totals: &CategoryTotals) -> Vec<CategoryShare> {
    let grand_total = totals.total();
    totals
        .iter()
        .map(|(category, total)| CategoryShare {
            category,
            total,
            share_percent: if grand_total > 0.0 { total / grand_total * 100.0 } else { 0.0 },
        })
        .collect()
}

/// Aggregates the records that fall inside `range`.
pub fn aggregate(records: &[RevenueRecord], range: DateRange) -> PeriodAggregate {
    let mut totals = CategoryTotals::new();
    let mut by_date: BTreeMap<NaiveDate, CategoryTotals> = BTreeMap::new();

    let in_range = records.iter().filter(|r| range.contains(r.date));
    for record in in_range {
        totals.accumulate(&record.totals);
        by_date.entry(record.date).or_default().accumulate(&record.totals);
    }

    let trend: Vec<TrendPoint> = by_date
        .into_iter()
        .map(|(date, totals)| TrendPoint {
            date,
            total: totals.total(),
            totals,
        })
        .collect();

    let (ranking, best_performance) = if trend.is_empty() {
        (Vec::new(), None)
    } else {
        let ranking = rank_categories(&totals);
        let best = ranking.first().cloned();
        (ranking, best)
    };

    let grand_total = totals.total();
    debug!(
        "Aggregated {} day(s) between {} and {}: total {}",
        trend.len(), range.from, range.to, grand_total
    );

    PeriodAggregate {
        from: range.from,
        to: range.to,
        grand_total,
        daily_average: calculate_average(grand_total, trend.len()),
        record_count: trend.len(),
        totals,
        ranking,
        best_performance,
        trend,
    }
}

pub fn period_statistics(
    records: &[RevenueRecord],
    period: Period,
    reference_date: NaiveDate,
    range: DateRange,
) -> PeriodStatistics {
    let aggregate = aggregate(records, range);
    let shares = category_shares(&aggregate.totals);
    PeriodStatistics {
        period,
        reference_date,
        aggregate,
        shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(date: &str, amounts: &[(Category, f64)]) -> RevenueRecord {
        RevenueRecord::new(d(date), amounts.iter().copied().collect())
    }

    #[test]
    fn two_day_scenario() {
        let records = vec![
            record("2025-01-01", &[(Category::Billiards, 10.0), (Category::Bar, 5.0)]),
            record("2025-01-02", &[(Category::Billiards, 0.0), (Category::Bar, 20.0)]),
        ];
        let agg = aggregate(&records, DateRange::new(d("2025-01-01"), d("2025-01-02")));

        assert_eq!(agg.totals.get(Category::Billiards), 10.0);
        assert_eq!(agg.totals.get(Category::Bar), 25.0);
        assert_eq!(agg.ranking[0].category, Category::Bar);
        assert_eq!(agg.ranking[0].total, 25.0);
        assert_eq!(agg.ranking[1].category, Category::Billiards);
        assert_eq!(agg.ranking[1].total, 10.0);
        let best = agg.best_performance.unwrap();
        assert_eq!((best.category, best.total), (Category::Bar, 25.0));
        assert_eq!(agg.trend.len(), 2);
        assert_eq!(agg.trend[0].date, d("2025-01-01"));
        assert_eq!(agg.trend[1].total, 20.0);
        assert_eq!(agg.daily_average, 17.5);
    }

    #[test]
    fn empty_range_is_not_an_error() {
        let agg = aggregate(&[], DateRange::new(d("2025-01-01"), d("2025-01-31")));
        assert_eq!(agg.grand_total, 0.0);
        assert!(agg.ranking.is_empty());
        assert!(agg.best_performance.is_none());
        assert!(agg.trend.is_empty());
        assert_eq!(agg.daily_average, 0.0);
    }

    #[test]
    fn ties_resolve_in_declaration_order() {
        let records = vec![record(
            "2025-01-01",
            &[(Category::VideoGames, 30.0), (Category::BowlingTime, 30.0), (Category::Bar, 30.0)],
        )];
        let agg = aggregate(&records, DateRange::single(d("2025-01-01")));
        let order: Vec<Category> = agg.ranking.iter().take(3).map(|r| r.category).collect();
        assert_eq!(order, vec![Category::BowlingTime, Category::Bar, Category::VideoGames]);
        assert_eq!(agg.best_performance.unwrap().category, Category::BowlingTime);
    }

    #[test]
    fn ranking_sum_matches_totals() {
        let records = vec![
            record("2025-02-03", &[(Category::Foosball, 12.5), (Category::Bar, 7.25)]),
            record("2025-02-01", &[(Category::BowlingGame, 40.0), (Category::VideoGames, 3.0)]),
            record("2025-02-02", &[(Category::Billiards, 18.0)]),
        ];
        let agg = aggregate(&records, DateRange::new(d("2025-02-01"), d("2025-02-28")));
        let ranking_sum: f64 = agg.ranking.iter().map(|r| r.total).sum();
        let totals_sum: f64 = agg.totals.iter().map(|(_, v)| v).sum();
        assert_eq!(ranking_sum, totals_sum);
        assert_eq!(ranking_sum, agg.grand_total);

        let max = agg.ranking.iter().map(|r| r.total).fold(f64::MIN, f64::max);
        assert_eq!(agg.best_performance.unwrap().total, max);

        let dates: Vec<NaiveDate> = agg.trend.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![d("2025-02-01"), d("2025-02-02"), d("2025-02-03")]);
    }

    #[test]
    fn records_outside_range_are_ignored() {
        let records = vec![
            record("2025-01-31", &[(Category::Bar, 100.0)]),
            record("2025-02-01", &[(Category::Bar, 1.0)]),
        ];
        let agg = aggregate(&records, DateRange::new(d("2025-02-01"), d("2025-02-28")));
        assert_eq!(agg.grand_total, 1.0);
        assert_eq!(agg.record_count, 1);
    }

    #[test]
    fn shares_are_zero_without_revenue() {
        let shares = category_shares(&CategoryTotals::new());
        assert_eq!(shares.len(), Category::ALL.len());
        assert!(shares.iter().all(|s| s.share_percent == 0.0));

        let totals: CategoryTotals = vec![(Category::Bar, 25.0), (Category::Billiards, 75.0)]
            .into_iter()
            .collect();
        let shares = category_shares(&totals);
        assert_eq!(shares[0].share_percent, 75.0);
        assert_eq!(shares[3].share_percent, 25.0);
    }
}
