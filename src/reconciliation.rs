use crate::calendar::MonthYear;
use crate::fill::forward_fill_seeded;
use crate::schema::ReconciliationRow;
use crate::series::{stable_sum, ExpenseSlot};
use serde::{Deserialize, Serialize};

// Mean of included totals over active slots only. Never resets.
#[derive(Default)]
struct ActivityAverage {
    sum_included: f64,
    active: u32,
}

impl ActivityAverage {
    fn observe(&mut self, slot: &ExpenseSlot) -> bool {
        let has_activity = slot.total_all > 0.0;
        if has_activity {
            self.sum_included += slot.total_included;
            self.active += 1;
        }
        has_activity
    }

    fn current(&self) -> f64 {
        if self.active == 0 {
            0.0
        } else {
            self.sum_included / self.active as f64
        }
    }
}

/// Derives one [`ReconciliationRow`] per slot, in slot order.
///
/// `budgets` must already be forward-filled and aligned with `expenses`,
/// one entry per slot.
pub fn reconcile(expenses: &[ExpenseSlot], budgets: &[f64]) -> Vec<ReconciliationRow> {
    debug_assert_eq!(
        expenses.len(),
        budgets.len(),
        "expense and budget series must cover the same slots"
    );
    let mut cumulative_balance = 0.0;
    let mut average = ActivityAverage::default();

    expenses
        .iter()
        .zip(budgets)
        .map(|(slot, &resolved_budget)| {
            let monthly_balance = resolved_budget - slot.total_all;
            cumulative_balance += monthly_balance;
            let has_activity = average.observe(slot);

            ReconciliationRow {
                month_year: slot.month_year,
                total_included: slot.total_included,
                total_all: slot.total_all,
                resolved_budget,
                exceeds_budget: slot.total_all > resolved_budget,
                monthly_balance,
                cumulative_balance,
                has_activity,
                running_average: average.current(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total_budget: f64,
    pub total_all: f64,
    pub total_included: f64,
    pub final_balance: f64,
    pub months_over_budget: usize,
    pub active_months: usize,
    pub average_included: f64,
}

pub fn summarize(rows: &[ReconciliationRow]) -> ReconciliationSummary {
    ReconciliationSummary {
        total_budget: stable_sum(rows.iter().map(|r| r.resolved_budget).collect()),
        total_all: stable_sum(rows.iter().map(|r| r.total_all).collect()),
        total_included: stable_sum(rows.iter().map(|r| r.total_included).collect()),
        final_balance: rows.last().map(|r| r.cumulative_balance).unwrap_or(0.0),
        months_over_budget: rows.iter().filter(|r| r.exceeds_budget).count(),
        active_months: rows.iter().filter(|r| r.has_activity).count(),
        average_included: rows.last().map(|r| r.running_average).unwrap_or(0.0),
    }
}

/// Budget left over from January through `through`, counting every expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearToDateBalance {
    pub through: MonthYear,
    pub budget_to_date: f64,
    pub spent_to_date: f64,
    pub balance: f64,
}

/// Sums the budget in effect for each month against everything spent.
///
/// `carried_budget` is the budget in effect before the first month (from any
/// earlier year); unlike the window reports, it seeds the fill.
pub fn year_to_date_balance(
    through: MonthYear,
    carried_budget: Option<f64>,
    explicit_budgets: &[Option<f64>],
    totals_all: &[f64],
) -> YearToDateBalance {
    let budget_to_date = stable_sum(forward_fill_seeded(carried_budget, explicit_budgets));
    let spent_to_date = stable_sum(totals_all.to_vec());

    YearToDateBalance {
        through,
        budget_to_date,
        spent_to_date,
        balance: budget_to_date - spent_to_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Month;
    use crate::fill::forward_fill;

    fn slots(included: &[f64], all: &[f64]) -> Vec<ExpenseSlot> {
        let start = MonthYear::new(Month::January, 2025);
        included
            .iter()
            .zip(all)
            .enumerate()
            .map(|(i, (&inc, &all))| ExpenseSlot {
                month_year: start.add_months(i as i32).unwrap(),
                total_included: inc,
                total_all: all,
            })
            .collect()
    }

    #[test]
    fn test_balances_and_overage() {
        let expenses = slots(&[800.0, 1200.0, 900.0], &[800.0, 1200.0, 900.0]);
        let rows = reconcile(&expenses, &[1000.0, 1000.0, 1000.0]);

        let monthly: Vec<f64> = rows.iter().map(|r| r.monthly_balance).collect();
        let cumulative: Vec<f64> = rows.iter().map(|r| r.cumulative_balance).collect();
        let exceeds: Vec<bool> = rows.iter().map(|r| r.exceeds_budget).collect();

        assert_eq!(monthly, vec![200.0, -200.0, 100.0]);
        assert_eq!(cumulative, vec![200.0, 0.0, 100.0]);
        assert_eq!(exceeds, vec![false, true, false]);
    }

    #[test]
    fn test_equal_spend_does_not_exceed() {
        let expenses = slots(&[1000.0], &[1000.0]);
        let rows = reconcile(&expenses, &[1000.0]);
        assert!(!rows[0].exceeds_budget);
        assert_eq!(rows[0].monthly_balance, 0.0);
    }

    #[test]
    fn test_overage_uses_all_spend() {
        // Included spend is under budget but the unrestricted total is not.
        let expenses = slots(&[600.0], &[1400.0]);
        let rows = reconcile(&expenses, &[1000.0]);
        assert!(rows[0].exceeds_budget);
        assert_eq!(rows[0].monthly_balance, -400.0);
    }

    #[test]
    fn test_running_average_skips_idle_months() {
        let totals = [0.0, 100.0, 0.0, 200.0];
        let expenses = slots(&totals, &totals);
        let rows = reconcile(&expenses, &[0.0; 4]);

        let averages: Vec<f64> = rows.iter().map(|r| r.running_average).collect();
        let activity: Vec<bool> = rows.iter().map(|r| r.has_activity).collect();
        assert_eq!(averages, vec![0.0, 100.0, 100.0, 150.0]);
        assert_eq!(activity, vec![false, true, false, true]);
    }

    #[test]
    fn test_running_average_uses_included_totals() {
        let expenses = slots(&[50.0, 0.0, 150.0], &[300.0, 40.0, 200.0]);
        let rows = reconcile(&expenses, &[0.0; 3]);
        // Month two is active (total_all > 0) even with nothing included.
        let averages: Vec<f64> = rows.iter().map(|r| r.running_average).collect();
        assert_eq!(averages, vec![50.0, 25.0, 200.0 / 3.0]);
    }

    #[test]
    fn test_cumulative_covers_inactive_slots() {
        let expenses = slots(&[0.0, 0.0, 500.0], &[0.0, 0.0, 500.0]);
        let budgets = forward_fill(&[Some(400.0), None, None]);
        let rows = reconcile(&expenses, &budgets);
        let cumulative: Vec<f64> = rows.iter().map(|r| r.cumulative_balance).collect();
        assert_eq!(cumulative, vec![400.0, 800.0, 700.0]);
    }

    #[test]
    fn test_summary() {
        let expenses = slots(&[800.0, 1100.0, 0.0], &[900.0, 1200.0, 0.0]);
        let rows = reconcile(&expenses, &[1000.0, 1000.0, 1000.0]);
        let summary = summarize(&rows);

        assert_eq!(summary.total_budget, 3000.0);
        assert_eq!(summary.total_all, 2100.0);
        assert_eq!(summary.total_included, 1900.0);
        assert_eq!(summary.final_balance, 900.0);
        assert_eq!(summary.months_over_budget, 1);
        assert_eq!(summary.active_months, 2);
        assert_eq!(summary.average_included, 950.0);

        let empty = summarize(&[]);
        assert_eq!(empty.final_balance, 0.0);
        assert_eq!(empty.active_months, 0);
        assert!(empty.total_budget.is_sign_positive());
        assert!(empty.total_all.is_sign_positive());
        assert!(empty.total_included.is_sign_positive());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "same slots")]
    fn test_mismatched_series_lengths_panic() {
        let expenses = slots(&[100.0, 200.0], &[100.0, 200.0]);
        reconcile(&expenses, &[1000.0]);
    }

    #[test]
    fn test_year_to_date_balance_without_expenses() {
        let through = MonthYear::new(Month::February, 2025);
        let ytd = year_to_date_balance(through, None, &[None, None], &[]);
        assert!(ytd.spent_to_date.is_sign_positive());
        assert!(ytd.budget_to_date.is_sign_positive());
        assert_eq!(ytd.balance, 0.0);
    }

    #[test]
    fn test_year_to_date_balance_seeds_from_history() {
        let through = MonthYear::new(Month::March, 2025);
        let ytd = year_to_date_balance(
            through,
            Some(900.0),
            &[None, Some(1000.0), None],
            &[850.0, 1200.0, 700.0],
        );
        assert_eq!(ytd.budget_to_date, 2900.0);
        assert_eq!(ytd.spent_to_date, 2750.0);
        assert!((ytd.balance - 150.0).abs() < 0.01);
        assert_eq!(ytd.through, through);
    }
}
