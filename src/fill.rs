/// Carries the last explicit value forward over gaps, starting from nothing:
/// slots before the first explicit value resolve to zero.
///
/// Only the given slots are consulted. A budget set before the first slot is
/// not looked up, even if storage has one.
pub fn forward_fill(explicit: &[Option<f64>]) -> Vec<f64> {
    forward_fill_seeded(None, explicit)
}

/// Like [`forward_fill`], but leading gaps take `seed` (when present) instead
/// of zero.
pub fn forward_fill_seeded(seed: Option<f64>, explicit: &[Option<f64>]) -> Vec<f64> {
    let mut carried = seed;
    explicit
        .iter()
        .map(|slot| {
            if let Some(value) = slot {
                carried = Some(*value);
            }
            carried.unwrap_or(0.0)
        })
        .collect()
}
