//! Per-task availability derived from calendars and leaves.
//!
//! The index pre-computes, for every task, the chronological list of
//! candidate `(date, hour)` slot units inside the planning window, plus a
//! reverse map of which tasks compete for each resource-hour. It is rebuilt
//! from scratch whenever the horizon is extended and is read-only afterwards.

use chrono::{Datelike, Days, NaiveDate};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{Assignment, CalendarSlot, Leave, Task};

/// Candidate slot units for one planning window.
#[derive(Clone, Debug)]
pub struct CandidateIndex {
    pub start_date: NaiveDate,
    pub horizon_days: u32,
    /// Per task, candidates sorted by (date asc, hour asc).
    candidates: FxHashMap<i64, Vec<(NaiveDate, u8)>>,
    /// (user_id, date, hour) -> tasks competing for that resource-hour.
    competitors: FxHashMap<(i64, NaiveDate, u8), Vec<i64>>,
    /// Tasks with no candidate slot at this horizon, in input order.
    pub infeasible: Vec<i64>,
}

impl CandidateIndex {
    /// Build the index for `horizon_days` days starting at `start_date`.
    ///
    /// A `(date, hour)` is a candidate for a task iff the date lies in the
    /// window, some calendar slot of the task covers that weekday and hour,
    /// and no leave of the task covers the date. Overlapping calendar
    /// windows are deduplicated.
    pub fn build(
        tasks: &[Task],
        calendar_slots: &[CalendarSlot],
        leaves: &[Leave],
        start_date: NaiveDate,
        horizon_days: u32,
    ) -> Self {
        let end_date = add_days(start_date, horizon_days);

        // Weekly hour masks per task: [weekday][hour] -> available
        let mut weekly: FxHashMap<i64, [[bool; 24]; 7]> = FxHashMap::default();
        for slot in calendar_slots {
            let mask = weekly.entry(slot.task_id).or_insert([[false; 24]; 7]);
            for hour in slot.hour_from..slot.hour_to {
                mask[slot.dayofweek as usize][hour as usize] = true;
            }
        }

        // Leave dates per task, clamped to the window
        let mut leave_days: FxHashMap<i64, FxHashSet<NaiveDate>> = FxHashMap::default();
        for leave in leaves {
            if leave.date_to < start_date || leave.date_from >= end_date {
                continue;
            }
            let days = leave_days.entry(leave.task_id).or_default();
            let mut date = leave.date_from.max(start_date);
            while date <= leave.date_to && date < end_date {
                days.insert(date);
                date = add_days(date, 1);
            }
        }

        let mut candidates: FxHashMap<i64, Vec<(NaiveDate, u8)>> = FxHashMap::default();
        let mut competitors: FxHashMap<(i64, NaiveDate, u8), Vec<i64>> = FxHashMap::default();
        let mut infeasible = Vec::new();

        for task in tasks {
            let mask = weekly.get(&task.id);
            let on_leave = leave_days.get(&task.id);
            let mut slots = Vec::new();

            if let Some(mask) = mask {
                let mut date = start_date;
                for _ in 0..horizon_days {
                    let excluded = on_leave.is_some_and(|days| days.contains(&date));
                    if !excluded {
                        let weekday = date.weekday().num_days_from_monday() as usize;
                        for (hour, available) in mask[weekday].iter().enumerate() {
                            if *available {
                                slots.push((date, hour as u8));
                            }
                        }
                    }
                    date = add_days(date, 1);
                }
            }

            if slots.is_empty() {
                infeasible.push(task.id);
                continue;
            }
            for &(date, hour) in &slots {
                competitors
                    .entry((task.user_id, date, hour))
                    .or_default()
                    .push(task.id);
            }
            candidates.insert(task.id, slots);
        }

        Self {
            start_date,
            horizon_days,
            candidates,
            competitors,
            infeasible,
        }
    }

    /// Chronological candidates of a task; empty for structurally infeasible tasks.
    pub fn candidates(&self, task_id: i64) -> &[(NaiveDate, u8)] {
        self.candidates.get(&task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tasks competing for one resource-hour.
    pub fn competitors(&self, user_id: i64, date: NaiveDate, hour: u8) -> &[i64] {
        self.competitors
            .get(&(user_id, date, hour))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_infeasible(&self, task_id: i64) -> bool {
        !self.candidates.contains_key(&task_id)
    }

    /// Total candidate slot units across all tasks.
    pub fn len(&self) -> usize {
        self.candidates.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Which resource-hours are already taken. Enforces the per-resource
/// exclusivity invariant across scheduler passes.
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    taken: FxHashSet<(i64, NaiveDate, u8)>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self, user_id: i64, date: NaiveDate, hour: u8) -> bool {
        !self.taken.contains(&(user_id, date, hour))
    }

    /// Claim a resource-hour. Returns false if it was already taken.
    pub fn take(&mut self, user_id: i64, date: NaiveDate, hour: u8) -> bool {
        self.taken.insert((user_id, date, hour))
    }

    /// Claim every resource-hour used by the given assignments.
    pub fn absorb(&mut self, assignments: &[Assignment]) {
        for a in assignments {
            self.taken.insert((a.user_id, a.date, a.hour));
        }
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

pub(crate) fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(days as u64)).unwrap_or(date)
}
