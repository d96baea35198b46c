// src/services/comparison.rs
use serde::Serialize;
use chrono::NaiveDate;

use crate::models::{Category, CategoryTotals, DateRange, RevenueRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub label: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDelta {
    pub category: Category,
    pub label: &'static str,
    pub total_a: f64,
    pub total_b: f64,
    pub difference: f64,
    pub percent_change: f64,
    /// Period B had nothing for this category, so `percent_change` is 0 by convention.
    pub no_baseline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub period_a: PeriodSummary,
    pub period_b: PeriodSummary,
    pub per_category: Vec<CategoryDelta>,
}

/// A date range with the name it is shown under.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRange {
    pub label: String,
    pub range: DateRange,
}

impl LabeledRange {
    pub fn new(label: impl Into<String>, range: DateRange) -> Self {
        LabeledRange { label: label.into(), range }
    }
}

/// `(a - b) / b * 100`, or 0 when `b` is 0.
pub fn percent_change(total_a: f64, total_b: f64) -> f64 {
    if total_b == 0.0 {
        0.0
    } else {
        (total_a - total_b) / total_b * 100.0
    }
}

fn sum_categories(records: &[RevenueRecord], range: DateRange) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    for record in records.iter().filter(|r| range.contains(r.date)) {
        totals.accumulate(&record.totals);
    }
    totals
}

fn sum_records(records: &[RevenueRecord], range: DateRange) -> f64 {
    records
        .iter()
        .filter(|r| range.contains(r.date))
        .map(RevenueRecord::total)
        .sum()
}

/// Compares two independent ranges. Per-category output keeps declaration order.
pub fn compare(
    a: &LabeledRange,
    records_a: &[RevenueRecord],
    b: &LabeledRange,
    records_b: &[RevenueRecord],
) -> ComparisonResult {
    let totals_a = sum_categories(records_a, a.range);
    let totals_b = sum_categories(records_b, b.range);

    let per_category = Category::ALL
        .iter()
        .map(|&category| {
            let total_a = totals_a.get(category);
            let total_b = totals_b.get(category);
            CategoryDelta {
                category,
                label: category.label(),
                total_a,
                total_b,
                difference: total_a - total_b,
                percent_change: percent_change(total_a, total_b),
                no_baseline: total_b == 0.0,
            }
        })
        .collect();

    ComparisonResult {
        period_a: PeriodSummary {
            label: a.label.clone(),
            from: a.range.from,
            to: a.range.to,
            total: sum_records(records_a, a.range),
        },
        period_b: PeriodSummary {
            label: b.label.clone(),
            from: b.range.from,
            to: b.range.to,
            total: sum_records(records_b, b.range),
        },
        per_category,
    }
}
