// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Revenue sources tracked per day. Declaration order is the canonical order
/// for aggregation, comparison, CSV columns and store columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Billiards,
    BowlingTime,
    BowlingGame,
    Bar,
    Foosball,
    VideoGames,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Billiards,
        Category::BowlingTime,
        Category::BowlingGame,
        Category::Bar,
        Category::Foosball,
        Category::VideoGames,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billiards => "billiards",
            Category::BowlingTime => "bowling_time",
            Category::BowlingGame => "bowling_game",
            Category::Bar => "bar",
            Category::Foosball => "foosball",
            Category::VideoGames => "video_games",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Billiards => "Billiards",
            Category::BowlingTime => "Bowling Time",
            Category::BowlingGame => "Bowling Game",
            Category::Bar => "Bar",
            Category::Foosball => "Foosball",
            Category::VideoGames => "Video Games",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category '{}'", s.trim()))
    }
}

/// Per-category amounts. Categories that were never set read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(BTreeMap<Category, f64>);

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, category: Category, amount: f64) {
        self.0.insert(category, amount);
    }

    pub fn add(&mut self, category: Category, amount: f64) {
        *self.0.entry(category).or_insert(0.0) += amount;
    }

    /// Adds every category of `other` into `self`.
    pub fn accumulate(&mut self, other: &CategoryTotals) {
        for category in Category::ALL {
            self.add(category, other.get(category));
        }
    }

    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// All categories in declaration order, zero-filled.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Keeps only the given categories.
    pub fn project(&self, categories: &[Category]) -> CategoryTotals {
        let mut projected = CategoryTotals::new();
        for category in categories {
            projected.set(*category, self.get(*category));
        }
        projected
    }

    pub fn validate(&self) -> Result<(), String> {
        for (category, amount) in &self.0 {
            if !amount.is_finite() || *amount < 0.0 {
                return Err(format!(
                    "Amount for '{}' must be a non-negative number, got {}",
                    category, amount
                ));
            }
        }
        Ok(())
    }
}

impl FromIterator<(Category, f64)> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        CategoryTotals(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub description: String,
    pub icon: String,
}

/// One row per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub date: NaiveDate,
    pub totals: CategoryTotals,
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
}

impl RevenueRecord {
    pub fn new(date: NaiveDate, totals: CategoryTotals) -> Self {
        RevenueRecord { date, totals, weather: None }
    }

    pub fn total(&self) -> f64 {
        self.totals.total()
    }
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    pub fn single(date: NaiveDate) -> Self {
        DateRange { from: date, to: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
