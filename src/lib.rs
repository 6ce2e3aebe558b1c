//! # Household Budget Series
//!
//! Turns sparse household expense and budget records, each tagged with a
//! month and a year, into dense twelve-slot series for trend charts and
//! budget-vs-actual comparison.
//!
//! ## Core Concepts
//!
//! - **Window**: twelve consecutive months, either a calendar year or the
//!   twelve months ending today. Every series is indexed by window slot.
//! - **Gap filling**: months without records are zero, never missing.
//! - **Forward-fill**: a month without an explicit budget inherits the last
//!   budget set earlier in the same window.
//! - **Reconciliation**: per-month balance, cumulative balance, overage flag
//!   and a running average over months with activity.
//!
//! ## Example
//!
//! ```rust,ignore
//! use household_budget_series::*;
//!
//! let mut store = MemoryStore::new();
//! store.add_category("Groceries", true);
//! store.record_expense("Groceries", "Supermarket", 120.0, MonthYear::parse("March", 2025)?)?;
//! store.set_budget(MonthYear::parse("January", 2025)?, 1000.0)?;
//!
//! let reporter = BudgetReporter::new(store);
//! let window = reporter.resolve_window(Some(MonthYear::parse("March", 2025)?))?;
//! let rows = reporter.build_reconciliation(&window)?;
//! assert_eq!(rows.len(), 12);
//! ```

pub mod calendar;
pub mod category;
pub mod error;
pub mod fill;
pub mod reconciliation;
pub mod schema;
pub mod series;
pub mod store;
pub mod window;

pub use calendar::{Month, MonthNaming, MonthYear};
pub use category::{category_shares, group_category, CategorySeries, CategoryShare};
pub use error::{BudgetSeriesError, Result, StoreError};
pub use fill::{forward_fill, forward_fill_seeded};
pub use reconciliation::{
    reconcile, summarize, year_to_date_balance, ReconciliationSummary, YearToDateBalance,
};
pub use schema::*;
pub use series::{build_budget_series, build_expense_series, build_label_series, ExpenseSlot};
pub use store::{ExpenseStore, LedgerSnapshot, MemoryStore, StoreResult};
pub use window::{resolve_window, resolve_window_at, Window, WindowMode, WINDOW_LEN};

use chrono::{Local, NaiveDate};
use log::{debug, info};

/// Runs the report computations against a storage collaborator.
///
/// Holds no state besides the store handle and configuration; each call
/// fetches fresh rows and returns freshly built values.
pub struct BudgetReporter<S> {
    store: S,
    config: ReportConfig,
}

impl<S: ExpenseStore> BudgetReporter<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ReportConfig::default())
    }

    pub fn with_config(store: S, config: ReportConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The date treated as "now".
    pub fn today(&self) -> NaiveDate {
        self.config
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn resolve_window(&self, anchor: Option<MonthYear>) -> Result<Window> {
        resolve_window_at(anchor, self.today())
    }

    pub fn build_reconciliation(&self, window: &Window) -> Result<Vec<ReconciliationRow>> {
        build_reconciliation(&self.store, window)
    }

    pub fn build_category_series(&self, category: &str, window: &Window) -> Result<CategorySeries> {
        build_category_series(&self.store, category, window, &self.config.no_data_label)
    }

    pub fn category_shares(&self, at: MonthYear) -> Result<Vec<CategoryShare>> {
        let rows = self
            .store
            .category_totals(at)
            .map_err(BudgetSeriesError::Storage)?;
        category_shares(&rows)
    }

    pub fn year_to_date_balance(&self, through: MonthYear) -> Result<YearToDateBalance> {
        build_year_to_date_balance(&self.store, through)
    }
}

pub fn build_reconciliation<S: ExpenseStore>(
    store: &S,
    window: &Window,
) -> Result<Vec<ReconciliationRow>> {
    info!(
        "Building reconciliation for {} .. {}",
        window.first(),
        window.last()
    );

    let expense_rows = store
        .expense_totals(window)
        .map_err(BudgetSeriesError::Storage)?;
    let budget_rows = store
        .budget_history(window)
        .map_err(BudgetSeriesError::Storage)?;
    debug!(
        "Fetched {} expense rows and {} budget rows",
        expense_rows.len(),
        budget_rows.len()
    );

    let expenses = build_expense_series(window, &expense_rows)?;
    let budgets = forward_fill(&build_budget_series(window, &budget_rows)?);

    Ok(reconcile(&expenses, &budgets))
}

pub fn build_category_series<S: ExpenseStore>(
    store: &S,
    category: &str,
    window: &Window,
    no_data_label: &str,
) -> Result<CategorySeries> {
    info!(
        "Building category series for '{}' over {} .. {}",
        category,
        window.first(),
        window.last()
    );

    let rows = store
        .category_breakdown(category, window)
        .map_err(BudgetSeriesError::Storage)?;
    group_category(category, window, &rows, no_data_label)
}

pub fn build_year_to_date_balance<S: ExpenseStore>(
    store: &S,
    through: MonthYear,
) -> Result<YearToDateBalance> {
    let window = Window::calendar_year(through.year)?;
    let months = through.month.index0() + 1;

    let carried = store
        .budget_in_effect(window.first().prev()?)
        .map_err(BudgetSeriesError::Storage)?
        .map(|entry| entry.amount.to_amount("budget"))
        .transpose()?;

    let budget_rows = store
        .budget_history(&window)
        .map_err(BudgetSeriesError::Storage)?;
    let expense_rows = store
        .expense_totals(&window)
        .map_err(BudgetSeriesError::Storage)?;

    let explicit = build_budget_series(&window, &budget_rows)?;
    let totals_all: Vec<f64> = build_expense_series(&window, &expense_rows)?
        .iter()
        .map(|slot| slot.total_all)
        .collect();

    let balance = year_to_date_balance(
        through,
        carried,
        &explicit[..months],
        &totals_all[..months],
    );
    info!(
        "Year-to-date balance through {}: {:.2}",
        through, balance.balance
    );
    Ok(balance)
}
