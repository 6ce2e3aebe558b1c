use household_budget_series::*;

fn main() -> anyhow::Result<()> {
    println!("📊 Household Budget Report Demo\n");

    let mut store = MemoryStore::new();
    store.add_category("Groceries", true);
    store.add_category("Bills", true);
    store.add_category("Rent", false);

    let january = MonthYear::parse("January", 2025)?;
    store.set_budget(january, 1000.0)?;
    store.set_budget(MonthYear::parse("July", 2025)?, 1150.0)?;

    for (offset, groceries) in [310.0, 280.5, 0.0, 402.2, 295.0, 330.0, 510.0, 0.0, 260.0]
        .into_iter()
        .enumerate()
    {
        let month = january.add_months(offset as i32)?;
        if groceries > 0.0 {
            store.record_expense("Groceries", "Supermarket", groceries, month)?;
            store.record_expense("Rent", "Flat", 700.0, month)?;
        }
        if offset % 2 == 0 {
            store.record_expense("Bills", "Electricity", 58.0 + offset as f64, month)?;
        }
    }

    let reporter = BudgetReporter::new(store);
    let window = reporter.resolve_window(Some(MonthYear::parse("September", 2025)?))?;
    let rows = reporter.build_reconciliation(&window)?;

    println!(
        "{:<16} {:>10} {:>10} {:>10} {:>12} {:>10}",
        "Month", "Included", "All", "Budget", "Cumulative", "Avg"
    );
    for row in &rows {
        println!(
            "{:<16} {:>10.2} {:>10.2} {:>10.2} {:>12.2} {:>10.2}{}",
            row.month_year.label(reporter.config().month_naming),
            row.total_included,
            row.total_all,
            row.resolved_budget,
            row.cumulative_balance,
            row.running_average,
            if row.exceeds_budget { "  ⚠ over" } else { "" }
        );
    }

    let summary = summarize(&rows);
    println!("\n📋 Summary:");
    println!("  Months over budget: {}", summary.months_over_budget);
    println!("  Active months:      {}", summary.active_months);
    println!("  Final balance:      {:.2}", summary.final_balance);

    let bills = reporter.build_category_series("Bills", &window)?;
    println!("\n🧾 Bills by label:");
    for label in &bills.labels {
        println!("  {}: {:?}", label, bills.series[label]);
    }

    let ytd = reporter.year_to_date_balance(MonthYear::parse("September", 2025)?)?;
    println!("\n✅ Year-to-date balance through {}: {:.2}", ytd.through, ytd.balance);

    Ok(())
}
