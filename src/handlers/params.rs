// src/handlers/params.rs
use chrono::NaiveDate;
use warp::Rejection;

use crate::models::{Category, DateRange};
use super::error::ApiError;

pub fn parse_date(name: &str, value: &str) -> Result<NaiveDate, Rejection> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        warp::reject::custom(ApiError::validation(format!(
            "Invalid {} '{}', expected yyyy-MM-dd",
            name, value
        )))
    })
}

pub fn parse_optional_date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, Rejection> {
    value.map(|v| parse_date(name, v)).transpose()
}

pub fn require_date(name: &str, value: Option<&str>) -> Result<NaiveDate, Rejection> {
    match value {
        Some(v) => parse_date(name, v),
        None => Err(warp::reject::custom(ApiError::validation(format!(
            "Missing required parameter: {}",
            name
        )))),
    }
}

pub fn ordered_range(from: NaiveDate, to: NaiveDate) -> Result<DateRange, Rejection> {
    if from > to {
        return Err(warp::reject::custom(ApiError::validation(format!(
            "Range start {} is after its end {}",
            from, to
        ))));
    }
    Ok(DateRange::new(from, to))
}

/// Comma separated category list; empty entries are skipped.
pub fn parse_categories(value: &str) -> Result<Vec<Category>, Rejection> {
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Category>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| warp::reject::custom(ApiError::validation(e)))
}
