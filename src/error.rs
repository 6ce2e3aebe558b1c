use crate::calendar::MonthYear;
use thiserror::Error;

/// Boxed failure raised by a storage collaborator.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum BudgetSeriesError {
    #[error("Invalid month name: {0}")]
    InvalidMonth(String),

    #[error("Invalid month number {0}: must be between 1 and 12")]
    InvalidMonthNumber(u32),

    #[error("Invalid amount for {field}: {value:?} is not a finite number")]
    InvalidAmount { field: String, value: String },

    #[error("Negative amount for {field}: {value}")]
    NegativeAmount { field: String, value: f64 },

    #[error("More than one budget entry for {0}")]
    DuplicateBudget(MonthYear),

    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BudgetSeriesError>;
