use crate::calendar::MonthYear;
use crate::error::Result;
use crate::schema::{CategoryLabelAggregate, CategoryTotal};
use crate::series::{build_label_series, stable_sum};
use crate::window::{Window, WINDOW_LEN};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stacked per-label series for one spending category across a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub category: String,
    pub ticks: Vec<MonthYear>,
    /// Lexically ascending; always at least one entry.
    pub labels: Vec<String>,
    pub series: BTreeMap<String, Vec<f64>>,
    /// `false` when the only series is the all-zero placeholder.
    pub has_data: bool,
}

impl CategorySeries {
    /// Placeholder series are not meant to be clicked or hovered.
    pub fn interactive(&self) -> bool {
        self.has_data
    }

    /// Total spent in the category per slot, across all labels.
    pub fn monthly_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.ticks.len()];
        for values in self.series.values() {
            for (total, value) in totals.iter_mut().zip(values) {
                *total += value;
            }
        }
        totals
    }
}

pub fn group_category(
    category: &str,
    window: &Window,
    rows: &[CategoryLabelAggregate],
    no_data_label: &str,
) -> Result<CategorySeries> {
    let series = build_label_series(window, rows)?;
    let has_data = series
        .values()
        .any(|values| values.iter().any(|v| *v != 0.0));

    let series = if has_data {
        series
    } else {
        debug!(
            "No spending for category '{}' in window {} .. {}; emitting placeholder",
            category,
            window.first(),
            window.last()
        );
        BTreeMap::from([(no_data_label.to_string(), vec![0.0; WINDOW_LEN])])
    };

    Ok(CategorySeries {
        category: category.to_string(),
        ticks: window.iter().collect(),
        labels: series.keys().cloned().collect(),
        series,
        has_data,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    /// Fraction of the month's total, 0.0 when the month total is zero.
    pub share: f64,
}

/// Per-category totals for one month, sorted by category name.
pub fn category_shares(rows: &[CategoryTotal]) -> Result<Vec<CategoryShare>> {
    let mut totals: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        totals
            .entry(row.category.as_str())
            .or_default()
            .push(row.total.to_amount("total")?);
    }

    let totals: Vec<(&str, f64)> = totals
        .into_iter()
        .map(|(category, values)| (category, stable_sum(values)))
        .collect();
    let grand_total = stable_sum(totals.iter().map(|(_, t)| *t).collect());

    Ok(totals
        .into_iter()
        .map(|(category, total)| CategoryShare {
            category: category.to_string(),
            total,
            share: if grand_total > 0.0 {
                total / grand_total
            } else {
                0.0
            },
        })
        .collect())
}
