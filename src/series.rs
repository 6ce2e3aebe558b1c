//! Merges sparse, keyed aggregates onto a [`Window`].
//!
//! Raw rows are indexed by key first and the window is walked afterwards, so
//! the order in which a collaborator returns rows never reaches the output.
//! Slots without a matching row are zero, never absent.

use crate::calendar::MonthYear;
use crate::error::{BudgetSeriesError, Result};
use crate::schema::{BudgetEntry, CategoryLabelAggregate, ExpenseAggregate};
use crate::window::{Window, WINDOW_LEN};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSlot {
    pub month_year: MonthYear,
    pub total_included: f64,
    pub total_all: f64,
}

/// Groups rows by window rank. Rows outside the window are dropped.
fn align_to_window<'a, R>(
    window: &Window,
    rows: &'a [R],
    key: impl Fn(&R) -> MonthYear,
) -> Vec<Vec<&'a R>> {
    let mut index: BTreeMap<usize, Vec<&R>> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in rows {
        match window.rank_of(key(row)) {
            Some(rank) => index.entry(rank).or_default().push(row),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "Dropped {} of {} rows outside window {} .. {}",
            dropped,
            rows.len(),
            window.first(),
            window.last()
        );
    }

    (0..WINDOW_LEN)
        .map(|rank| index.remove(&rank).unwrap_or_default())
        .collect()
}

/// Sums in a fixed order so the result does not depend on row order.
///
/// Starts from positive zero: `Iterator::sum` yields `-0.0` for no values.
pub(crate) fn stable_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

pub fn build_expense_series(window: &Window, rows: &[ExpenseAggregate]) -> Result<Vec<ExpenseSlot>> {
    let aligned = align_to_window(window, rows, |r| r.month_year);

    window
        .iter()
        .zip(aligned)
        .map(|(month_year, matches)| -> Result<ExpenseSlot> {
            if matches.len() > 1 {
                warn!(
                    "{} expense rows for {}; summing them",
                    matches.len(),
                    month_year
                );
            }

            let mut included = Vec::with_capacity(matches.len());
            let mut all = Vec::with_capacity(matches.len());
            for row in matches {
                included.push(row.total_included.to_amount("total_included")?);
                all.push(row.total_all.to_amount("total_all")?);
            }

            Ok(ExpenseSlot {
                month_year,
                total_included: stable_sum(included),
                total_all: stable_sum(all),
            })
        })
        .collect()
}

/// Explicit budget per slot; `None` where no budget was ever set.
pub fn build_budget_series(window: &Window, entries: &[BudgetEntry]) -> Result<Vec<Option<f64>>> {
    let aligned = align_to_window(window, entries, |e| e.month_year);

    window
        .iter()
        .zip(aligned)
        .map(|(month_year, matches)| match matches.as_slice() {
            [] => Ok(None),
            [entry] => entry.amount.to_amount("budget").map(Some),
            _ => Err(BudgetSeriesError::DuplicateBudget(month_year)),
        })
        .collect()
}

/// One zero-filled series per label, keyed and ordered lexically.
///
/// Labels are collected from every row, including rows outside the window,
/// but values only land on window slots.
pub fn build_label_series(
    window: &Window,
    rows: &[CategoryLabelAggregate],
) -> Result<BTreeMap<String, Vec<f64>>> {
    let mut labels: BTreeSet<&str> = BTreeSet::new();
    let mut index: BTreeMap<(&str, usize), Vec<f64>> = BTreeMap::new();

    for row in rows {
        let total = row.total.to_amount("total")?;
        labels.insert(row.label.as_str());
        if let Some(rank) = window.rank_of(row.month_year) {
            index
                .entry((row.label.as_str(), rank))
                .or_default()
                .push(total);
        }
    }

    let series: BTreeMap<String, Vec<f64>> = labels
        .into_iter()
        .map(|label| {
            let values: Vec<f64> = (0..WINDOW_LEN)
                .map(|rank| {
                    index
                        .remove(&(label, rank))
                        .map(stable_sum)
                        .unwrap_or(0.0)
                })
                .collect();
            (label.to_string(), values)
        })
        .collect();

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Month;
    use crate::schema::RawAmount;

    fn expense(month: Month, year: i32, included: f64, all: f64) -> ExpenseAggregate {
        ExpenseAggregate {
            month_year: MonthYear::new(month, year),
            total_included: RawAmount::Number(included),
            total_all: RawAmount::Number(all),
        }
    }

    fn budget(month: Month, year: i32, amount: f64) -> BudgetEntry {
        BudgetEntry {
            month_year: MonthYear::new(month, year),
            amount: RawAmount::Number(amount),
        }
    }

    fn label_row(month: Month, year: i32, label: &str, total: f64) -> CategoryLabelAggregate {
        CategoryLabelAggregate {
            month_year: MonthYear::new(month, year),
            label: label.to_string(),
            total: RawAmount::Number(total),
        }
    }

    #[test]
    fn test_expense_series_zero_fills_gaps() {
        let window = Window::calendar_year(2025).unwrap();
        let rows = vec![
            expense(Month::March, 2025, 300.0, 900.0),
            expense(Month::January, 2025, 100.0, 700.0),
        ];

        let series = build_expense_series(&window, &rows).unwrap();
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].total_included, 100.0);
        assert_eq!(series[0].total_all, 700.0);
        assert_eq!(series[1].total_included, 0.0);
        assert_eq!(series[1].total_all, 0.0);
        assert_eq!(series[2].total_all, 900.0);
        for (slot, my) in series.iter().zip(window.iter()) {
            assert_eq!(slot.month_year, my);
        }
    }

    #[test]
    fn test_gap_slots_are_positive_zero() {
        let window = Window::calendar_year(2025).unwrap();
        let series = build_expense_series(&window, &[]).unwrap();
        for slot in &series {
            assert!(slot.total_included.is_sign_positive());
            assert!(slot.total_all.is_sign_positive());
        }

        let labels = build_label_series(
            &window,
            &[label_row(Month::June, 2024, "Butcher", 40.0)],
        )
        .unwrap();
        assert!(labels["Butcher"].iter().all(|v| v.is_sign_positive()));
        assert!(!serde_json::to_string(&series).unwrap().contains("-0.0"));
    }

    #[test]
    fn test_expense_series_matches_on_year_too() {
        let window = Window::rolling(MonthYear::new(Month::February, 2026)).unwrap();
        let rows = vec![
            // Outside the window: same month name as slot 0 but a year later.
            expense(Month::March, 2026, 50.0, 50.0),
            expense(Month::January, 2026, 80.0, 90.0),
            expense(Month::March, 2025, 10.0, 20.0),
        ];

        let series = build_expense_series(&window, &rows).unwrap();
        assert_eq!(series[0].total_all, 20.0);
        assert_eq!(series[10].total_all, 90.0);
        let total: f64 = series.iter().map(|s| s.total_all).sum();
        assert!((total - 110.0).abs() < 0.01);
    }

    #[test]
    fn test_expense_series_sums_duplicates() {
        let window = Window::calendar_year(2025).unwrap();
        let rows = vec![
            expense(Month::May, 2025, 10.0, 15.0),
            expense(Month::May, 2025, 5.0, 5.0),
        ];
        let series = build_expense_series(&window, &rows).unwrap();
        assert_eq!(series[4].total_included, 15.0);
        assert_eq!(series[4].total_all, 20.0);
    }

    #[test]
    fn test_expense_series_rejects_non_numeric() {
        let window = Window::calendar_year(2025).unwrap();
        let rows = vec![ExpenseAggregate {
            month_year: MonthYear::new(Month::May, 2025),
            total_included: RawAmount::from("12.0"),
            total_all: RawAmount::from("twelve"),
        }];
        assert!(matches!(
            build_expense_series(&window, &rows),
            Err(BudgetSeriesError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_budget_series_marks_absent_slots() {
        let window = Window::calendar_year(2025).unwrap();
        let entries = vec![
            budget(Month::April, 2025, 1200.0),
            budget(Month::January, 2025, 1000.0),
            budget(Month::December, 2024, 900.0),
        ];

        let series = build_budget_series(&window, &entries).unwrap();
        assert_eq!(series[0], Some(1000.0));
        assert_eq!(series[1], None);
        assert_eq!(series[3], Some(1200.0));
        assert_eq!(series.iter().filter(|b| b.is_some()).count(), 2);
    }

    #[test]
    fn test_budget_series_rejects_duplicates() {
        let window = Window::calendar_year(2025).unwrap();
        let entries = vec![
            budget(Month::April, 2025, 1200.0),
            budget(Month::April, 2025, 1300.0),
        ];
        match build_budget_series(&window, &entries) {
            Err(BudgetSeriesError::DuplicateBudget(my)) => {
                assert_eq!(my, MonthYear::new(Month::April, 2025))
            }
            other => panic!("expected duplicate budget error, got {:?}", other),
        }
    }

    #[test]
    fn test_label_series_union_and_order() {
        let window = Window::calendar_year(2025).unwrap();
        let rows = vec![
            label_row(Month::February, 2025, "Supermarket", 120.0),
            label_row(Month::February, 2025, "Bakery", 15.0),
            // Only seen in the previous year, still listed.
            label_row(Month::June, 2024, "Butcher", 40.0),
            label_row(Month::November, 2025, "Bakery", 9.5),
        ];

        let series = build_label_series(&window, &rows).unwrap();
        let labels: Vec<&String> = series.keys().collect();
        assert_eq!(labels, vec!["Bakery", "Butcher", "Supermarket"]);
        assert_eq!(series["Bakery"][1], 15.0);
        assert_eq!(series["Bakery"][10], 9.5);
        assert!(series["Butcher"].iter().all(|v| *v == 0.0));
        assert_eq!(series["Supermarket"].len(), 12);
    }

    #[test]
    fn test_row_order_does_not_leak() {
        let window = Window::calendar_year(2025).unwrap();
        let mut rows = vec![
            label_row(Month::March, 2025, "b", 0.1),
            label_row(Month::March, 2025, "b", 0.2),
            label_row(Month::March, 2025, "b", 0.3),
            label_row(Month::January, 2025, "a", 1.0),
        ];
        let forward = build_label_series(&window, &rows).unwrap();
        rows.reverse();
        let backward = build_label_series(&window, &rows).unwrap();
        assert_eq!(
            serde_json::to_string(&forward).unwrap(),
            serde_json::to_string(&backward).unwrap()
        );
    }
}
