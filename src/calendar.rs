use crate::error::{BudgetSeriesError, Result};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

const ENGLISH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const SPANISH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Which set of month names is used when rendering labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum MonthNaming {
    #[default]
    #[schemars(description = "January, February, ... December")]
    English,

    #[schemars(description = "Enero, Febrero, ... Diciembre")]
    Spanish,
}

impl MonthNaming {
    fn names(self) -> &'static [&'static str; 12] {
        match self {
            MonthNaming::English => &ENGLISH_NAMES,
            MonthNaming::Spanish => &SPANISH_NAMES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// 0-based position within the calendar year (January = 0).
    pub fn index0(self) -> usize {
        self as usize
    }

    /// 1-based calendar month number (January = 1).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Result<Self> {
        if !(1..=12).contains(&number) {
            return Err(BudgetSeriesError::InvalidMonthNumber(number));
        }
        Ok(Self::ALL[(number - 1) as usize])
    }

    /// Parses a canonical month name in either supported naming.
    ///
    /// Matching is exact: no trimming, no case folding, no abbreviations.
    pub fn from_name(name: &str) -> Result<Self> {
        ENGLISH_NAMES
            .iter()
            .position(|n| *n == name)
            .or_else(|| SPANISH_NAMES.iter().position(|n| *n == name))
            .map(|idx| Self::ALL[idx])
            .ok_or_else(|| BudgetSeriesError::InvalidMonth(name.to_string()))
    }

    pub fn name(self, naming: MonthNaming) -> &'static str {
        naming.names()[self.index0()]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(MonthNaming::English))
    }
}

impl TryFrom<String> for Month {
    type Error = BudgetSeriesError;

    fn try_from(value: String) -> Result<Self> {
        Month::from_name(&value)
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.name(MonthNaming::English).to_string()
    }
}

/// A calendar month in a given year.
///
/// Field order matters: the derived ordering compares the year first, so
/// December 2024 sorts before January 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthYear {
    pub year: i32,
    pub month: Month,
}

impl MonthYear {
    pub fn new(month: Month, year: i32) -> Self {
        Self { year, month }
    }

    /// Builds a `MonthYear` from a month name, failing on anything outside the
    /// fixed set of twelve names.
    pub fn parse(month_name: &str, year: i32) -> Result<Self> {
        Ok(Self::new(Month::from_name(month_name)?, year))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(Month::ALL[date.month0() as usize], date.year())
    }

    /// Absolute month count since year 0, used for calendar arithmetic.
    fn ordinal(self) -> i64 {
        self.year as i64 * 12 + self.month.index0() as i64
    }

    fn from_ordinal(ordinal: i64) -> Result<Self> {
        let year = i32::try_from(ordinal.div_euclid(12)).map_err(|_| {
            BudgetSeriesError::DateError(format!("Month ordinal {} is out of range", ordinal))
        })?;
        let month = Month::ALL[ordinal.rem_euclid(12) as usize];
        Ok(Self::new(month, year))
    }

    /// Moves `delta` calendar months forward (or backward when negative),
    /// carrying into the year.
    pub fn add_months(self, delta: i32) -> Result<Self> {
        Self::from_ordinal(self.ordinal() + delta as i64)
    }

    pub fn next(self) -> Result<Self> {
        self.add_months(1)
    }

    pub fn prev(self) -> Result<Self> {
        self.add_months(-1)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(self, other: MonthYear) -> i64 {
        other.ordinal() - self.ordinal()
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.number(), 1)
    }

    pub fn label(self, naming: MonthNaming) -> String {
        format!("{} {}", self.month.name(naming), self.year)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
