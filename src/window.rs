//! Month window resolution.
//!
//! Every report works over exactly twelve consecutive calendar months. The
//! window is either a full calendar year, or the twelve months ending at a
//! reference date. Both modes resolve into the same [`Window`] type so the
//! downstream builders never need to know which mode produced it.

use crate::calendar::{Month, MonthNaming, MonthYear};
use crate::error::Result;
use chrono::{Local, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

pub const WINDOW_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindowMode {
    /// January through December of `year`.
    CalendarYear { year: i32 },
    /// Twelve consecutive months, the last one being `end`.
    Rolling { end: MonthYear },
}

impl WindowMode {
    /// Chooses the mode for an optional anchor. The anchor's month is
    /// informational only: a present anchor always selects its whole year.
    pub fn from_anchor(anchor: Option<MonthYear>, today: NaiveDate) -> Self {
        match anchor {
            Some(anchor) => WindowMode::CalendarYear { year: anchor.year },
            None => WindowMode::Rolling {
                end: MonthYear::from_date(today),
            },
        }
    }
}

/// Twelve distinct months in strictly increasing chronological order.
///
/// The position of a month within the window is its rank (0..=11); all
/// series produced from a window are indexed by that rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    mode: WindowMode,
    slots: [MonthYear; WINDOW_LEN],
}

impl Window {
    pub fn from_mode(mode: WindowMode) -> Result<Self> {
        let first = match mode {
            WindowMode::CalendarYear { year } => MonthYear::new(Month::January, year),
            WindowMode::Rolling { end } => end.add_months(-(WINDOW_LEN as i32 - 1))?,
        };

        let mut slots = [first; WINDOW_LEN];
        for rank in 1..WINDOW_LEN {
            slots[rank] = slots[rank - 1].next()?;
        }

        debug!(
            "Resolved {:?} window: {} .. {}",
            mode, slots[0], slots[WINDOW_LEN - 1]
        );

        Ok(Self { mode, slots })
    }

    pub fn calendar_year(year: i32) -> Result<Self> {
        Self::from_mode(WindowMode::CalendarYear { year })
    }

    pub fn rolling(end: MonthYear) -> Result<Self> {
        Self::from_mode(WindowMode::Rolling { end })
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn slots(&self) -> &[MonthYear; WINDOW_LEN] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = MonthYear> + '_ {
        self.slots.iter().copied()
    }

    pub fn first(&self) -> MonthYear {
        self.slots[0]
    }

    pub fn last(&self) -> MonthYear {
        self.slots[WINDOW_LEN - 1]
    }

    /// Rank of `month_year` within the window, or `None` if it falls outside.
    pub fn rank_of(&self, month_year: MonthYear) -> Option<usize> {
        let offset = self.first().months_until(month_year);
        if (0..WINDOW_LEN as i64).contains(&offset) {
            Some(offset as usize)
        } else {
            None
        }
    }

    pub fn contains(&self, month_year: MonthYear) -> bool {
        self.rank_of(month_year).is_some()
    }

    /// Axis tick labels, one per slot.
    pub fn labels(&self, naming: MonthNaming) -> Vec<String> {
        self.iter().map(|my| my.label(naming)).collect()
    }
}

/// Resolves the window for an optional anchor, using `today` as "now".
pub fn resolve_window_at(anchor: Option<MonthYear>, today: NaiveDate) -> Result<Window> {
    Window::from_mode(WindowMode::from_anchor(anchor, today))
}

/// Resolves the window for an optional anchor against the local clock.
pub fn resolve_window(anchor: Option<MonthYear>) -> Result<Window> {
    resolve_window_at(anchor, Local::now().date_naive())
}
