// src/services/periods.rs
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::DateRange;

/// Aggregation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(format!(
                "Unknown period '{}', expected one of day, week, month, year",
                other
            )),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        };
        write!(f, "{}", name)
    }
}

/// Calendar bounds of the period containing `reference`.
/// Weeks start on Monday; `Day` is the reference day alone.
pub fn period_bounds(period: Period, reference: NaiveDate) -> DateRange {
    match period {
        Period::Day => DateRange::single(reference),
        Period::Week => {
            let from = reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
            DateRange::new(from, from + Duration::days(6))
        }
        Period::Month => DateRange::new(start_of_month(reference), end_of_month(reference)),
        Period::Year => {
            // Jan 1 and Dec 31 exist in every year chrono can represent here.
            let from = reference.with_ordinal(1).unwrap_or(reference);
            let to = NaiveDate::from_ymd_opt(reference.year(), 12, 31).unwrap_or(reference);
            DateRange::new(from, to)
        }
    }
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Named ranges offered by the dashboard filters, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Today,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    ThisYear,
}

impl FromStr for RangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "today" => Ok(RangePreset::Today),
            "last7days" | "last_7_days" => Ok(RangePreset::Last7Days),
            "last30days" | "last_30_days" => Ok(RangePreset::Last30Days),
            "this_month" | "thismonth" => Ok(RangePreset::ThisMonth),
            "last_month" | "lastmonth" => Ok(RangePreset::LastMonth),
            "this_year" | "thisyear" => Ok(RangePreset::ThisYear),
            other => Err(format!("Unknown range preset '{}'", other)),
        }
    }
}

impl RangePreset {
    /// Ranges end today, except `LastMonth` which covers the whole previous month.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        match self {
            RangePreset::Today => DateRange::single(today),
            RangePreset::Last7Days => DateRange::new(today - Duration::days(7), today),
            RangePreset::Last30Days => DateRange::new(today - Duration::days(30), today),
            RangePreset::ThisMonth => DateRange::new(start_of_month(today), today),
            RangePreset::LastMonth => {
                let previous = start_of_month(today).pred_opt().unwrap_or(today);
                DateRange::new(start_of_month(previous), previous)
            }
            RangePreset::ThisYear => {
                DateRange::new(today.with_ordinal(1).unwrap_or(today), today)
            }
        }
    }
}
