use crate::calendar::{Month, MonthYear};
use crate::error::{BudgetSeriesError, Result, StoreError};
use crate::schema::{BudgetEntry, CategoryLabelAggregate, CategoryTotal, ExpenseAggregate, RawAmount};
use crate::window::Window;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Source of raw aggregates. Implementations own connections, queries and
/// retries; every call is treated as an opaque blocking fetch.
pub trait ExpenseStore {
    /// Monthly totals for months in the window that have any expense.
    fn expense_totals(&self, window: &Window) -> StoreResult<Vec<ExpenseAggregate>>;

    /// Per-category totals for a single month.
    fn category_totals(&self, at: MonthYear) -> StoreResult<Vec<CategoryTotal>>;

    /// Explicit budgets set for months in the window.
    fn budget_history(&self, window: &Window) -> StoreResult<Vec<BudgetEntry>>;

    /// Per-label monthly totals for one category. May include months outside
    /// the window; their labels still count.
    fn category_breakdown(
        &self,
        category: &str,
        window: &Window,
    ) -> StoreResult<Vec<CategoryLabelAggregate>>;

    /// The most recent explicit budget at or before `at`, across all history.
    fn budget_in_effect(&self, at: MonthYear) -> StoreResult<Option<BudgetEntry>>;
}

impl<S: ExpenseStore + ?Sized> ExpenseStore for &S {
    fn expense_totals(&self, window: &Window) -> StoreResult<Vec<ExpenseAggregate>> {
        (**self).expense_totals(window)
    }

    fn category_totals(&self, at: MonthYear) -> StoreResult<Vec<CategoryTotal>> {
        (**self).category_totals(at)
    }

    fn budget_history(&self, window: &Window) -> StoreResult<Vec<BudgetEntry>> {
        (**self).budget_history(window)
    }

    fn category_breakdown(
        &self,
        category: &str,
        window: &Window,
    ) -> StoreResult<Vec<CategoryLabelAggregate>> {
        (**self).category_breakdown(category, window)
    }

    fn budget_in_effect(&self, at: MonthYear) -> StoreResult<Option<BudgetEntry>> {
        (**self).budget_in_effect(at)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    /// Whether the category counts towards `total_included`.
    #[serde(default = "default_true")]
    pub include_in_summary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: RawAmount,
    pub month: Month,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub month: Month,
    pub year: i32,
    pub amount: RawAmount,
}

/// Serialized form of a household ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
}

#[derive(Debug, Clone)]
struct Expense {
    category: String,
    description: String,
    amount: f64,
    month_year: MonthYear,
}

/// In-memory ledger that aggregates the way the SQL-backed store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    categories: BTreeMap<String, bool>,
    expenses: Vec<Expense>,
    budgets: BTreeMap<MonthYear, f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every amount and rejects duplicate budgets.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self> {
        let mut store = Self::new();

        for category in snapshot.categories {
            store.add_category(category.name, category.include_in_summary);
        }

        for expense in snapshot.expenses {
            let amount = expense.amount.to_amount("amount")?;
            store.expenses.push(Expense {
                category: expense.category,
                description: expense.description,
                amount,
                month_year: MonthYear::new(expense.month, expense.year),
            });
        }

        for budget in snapshot.budgets {
            let month_year = MonthYear::new(budget.month, budget.year);
            let amount = budget.amount.to_amount("budget")?;
            if store.budgets.insert(month_year, amount).is_some() {
                return Err(BudgetSeriesError::DuplicateBudget(month_year));
            }
        }

        debug!(
            "Loaded ledger snapshot: {} categories, {} expenses, {} budgets",
            store.categories.len(),
            store.expenses.len(),
            store.budgets.len()
        );

        Ok(store)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: LedgerSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn add_category(&mut self, name: impl Into<String>, include_in_summary: bool) {
        self.categories.insert(name.into(), include_in_summary);
    }

    pub fn record_expense(
        &mut self,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        month_year: MonthYear,
    ) -> Result<()> {
        let amount = RawAmount::Number(amount).to_amount("amount")?;
        self.expenses.push(Expense {
            category: category.into(),
            description: description.into(),
            amount,
            month_year,
        });
        Ok(())
    }

    /// Sets the budget for a month, replacing any earlier one for that month.
    pub fn set_budget(&mut self, month_year: MonthYear, amount: f64) -> Result<()> {
        let amount = RawAmount::Number(amount).to_amount("budget")?;
        self.budgets.insert(month_year, amount);
        Ok(())
    }

    // Expenses whose category is unknown are never included.
    fn is_included(&self, category: &str) -> bool {
        self.categories.get(category).copied().unwrap_or(false)
    }
}

impl ExpenseStore for MemoryStore {
    fn expense_totals(&self, window: &Window) -> StoreResult<Vec<ExpenseAggregate>> {
        let mut totals: BTreeMap<MonthYear, (f64, f64)> = BTreeMap::new();
        for expense in self.expenses.iter().filter(|e| window.contains(e.month_year)) {
            let entry = totals.entry(expense.month_year).or_insert((0.0, 0.0));
            if self.is_included(&expense.category) {
                entry.0 += expense.amount;
            }
            entry.1 += expense.amount;
        }

        Ok(totals
            .into_iter()
            .map(|(month_year, (included, all))| ExpenseAggregate {
                month_year,
                total_included: RawAmount::Number(included),
                total_all: RawAmount::Number(all),
            })
            .collect())
    }

    fn category_totals(&self, at: MonthYear) -> StoreResult<Vec<CategoryTotal>> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for expense in self.expenses.iter().filter(|e| e.month_year == at) {
            *totals.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
        }

        Ok(totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total: RawAmount::Number(total),
            })
            .collect())
    }

    fn budget_history(&self, window: &Window) -> StoreResult<Vec<BudgetEntry>> {
        Ok(self
            .budgets
            .range(window.first()..=window.last())
            .map(|(month_year, amount)| BudgetEntry {
                month_year: *month_year,
                amount: RawAmount::Number(*amount),
            })
            .collect())
    }

    fn category_breakdown(
        &self,
        category: &str,
        _window: &Window,
    ) -> StoreResult<Vec<CategoryLabelAggregate>> {
        let mut totals: BTreeMap<(MonthYear, &str), f64> = BTreeMap::new();
        for expense in self.expenses.iter().filter(|e| e.category == category) {
            *totals
                .entry((expense.month_year, expense.description.as_str()))
                .or_insert(0.0) += expense.amount;
        }

        Ok(totals
            .into_iter()
            .map(|((month_year, label), total)| CategoryLabelAggregate {
                month_year,
                label: label.to_string(),
                total: RawAmount::Number(total),
            })
            .collect())
    }

    fn budget_in_effect(&self, at: MonthYear) -> StoreResult<Option<BudgetEntry>> {
        Ok(self
            .budgets
            .range(..=at)
            .next_back()
            .map(|(month_year, amount)| BudgetEntry {
                month_year: *month_year,
                amount: RawAmount::Number(*amount),
            }))
    }
}
