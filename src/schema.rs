use crate::calendar::{MonthNaming, MonthYear};
use crate::error::{BudgetSeriesError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A monetary value as handed over by a storage collaborator.
///
/// Decimal columns frequently arrive as text, so both shapes are accepted and
/// converted with [`RawAmount::to_amount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    /// Converts to `f64`. Unparseable or non-finite values are a data fault,
    /// and so are negative ones; nothing is ever coerced to zero.
    pub fn to_amount(&self, field: &str) -> Result<f64> {
        let value = match self {
            RawAmount::Number(n) => *n,
            RawAmount::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| BudgetSeriesError::InvalidAmount {
                        field: field.to_string(),
                        value: text.clone(),
                    })?
            }
        };

        if !value.is_finite() {
            return Err(BudgetSeriesError::InvalidAmount {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        if value < 0.0 {
            return Err(BudgetSeriesError::NegativeAmount {
                field: field.to_string(),
                value,
            });
        }
        Ok(value)
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

/// Monthly expense totals, one row per month with any recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAggregate {
    pub month_year: MonthYear,
    /// Sum over categories flagged for inclusion in summaries.
    pub total_included: RawAmount,
    /// Unrestricted sum over every category.
    pub total_all: RawAmount,
}

/// The authoritative budget for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub month_year: MonthYear,
    pub amount: RawAmount,
}

/// Spending for one free-text label inside a category, for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLabelAggregate {
    pub month_year: MonthYear,
    pub label: String,
    pub total: RawAmount,
}

/// Spending for one category in a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: RawAmount,
}

/// One window slot's comparison of actual spend against budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub month_year: MonthYear,
    pub total_included: f64,
    pub total_all: f64,
    pub resolved_budget: f64,
    pub exceeds_budget: bool,
    /// Budget minus everything spent; negative means overspend.
    pub monthly_balance: f64,
    pub cumulative_balance: f64,
    pub has_activity: bool,
    /// Mean of `total_included` over the active slots seen so far.
    pub running_average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    #[serde(default)]
    #[schemars(description = "Month names used for axis labels. Parsing accepts both namings.")]
    pub month_naming: MonthNaming,

    #[serde(default = "default_no_data_label")]
    #[schemars(
        description = "Label of the placeholder series emitted when a category has no spending in the window"
    )]
    pub no_data_label: String,

    #[serde(default)]
    #[schemars(
        description = "Date in YYYY-MM-DD format treated as 'now' for rolling windows. When absent the local clock is used."
    )]
    pub reference_date: Option<NaiveDate>,
}

fn default_no_data_label() -> String {
    "No data".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            month_naming: MonthNaming::default(),
            no_data_label: default_no_data_label(),
            reference_date: None,
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
