//! Boundary records for the planning engine.
//!
//! Inputs arrive as three tables (tasks, calendar slots, leaves) plus
//! per-call parameters. Everything is validated here, fail-fast, before the
//! engine builds any state; unknown fields in the input document are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised at the input boundary. The only error kind that crosses the
/// planning API; everything downstream is folded into the solution document.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("invalid input document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate task id {0}")]
    DuplicateTaskId(i64),
    #[error("calendar slot for task {task_id}: dayofweek {dayofweek} out of range 0..=6")]
    DayOfWeekOutOfRange { task_id: i64, dayofweek: u8 },
    #[error("calendar slot for task {task_id}: hours must lie in 0..=24, got {hour_from}..{hour_to}")]
    HourOutOfRange {
        task_id: i64,
        hour_from: u8,
        hour_to: u8,
    },
    #[error("calendar slot for task {task_id}: window {hour_from}..{hour_to} is empty or reversed")]
    EmptyWindow {
        task_id: i64,
        hour_from: u8,
        hour_to: u8,
    },
    #[error("leave for task {task_id}: date_from {date_from} is after date_to {date_to}")]
    LeaveRange {
        task_id: i64,
        date_from: NaiveDate,
        date_to: NaiveDate,
    },
}

/// A task to be planned: a bag of whole-hour units owned by one resource.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    /// The single resource this task is assigned to.
    pub user_id: i64,
    #[serde(deserialize_with = "de_remaining_hours")]
    pub remaining_hours: u32,
    #[serde(default = "default_priority")]
    pub priority_score: f64,
}

impl Task {
    pub fn new(id: i64, name: impl Into<String>, user_id: i64, remaining_hours: u32) -> Self {
        Self {
            id,
            name: name.into(),
            user_id,
            remaining_hours,
            priority_score: default_priority(),
        }
    }

    pub fn with_priority(mut self, priority_score: f64) -> Self {
        self.priority_score = priority_score;
        self
    }
}

fn default_priority() -> f64 {
    50.0
}

/// Rejects negative and fractional hour counts with a precise message.
fn de_remaining_hours<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    u32::try_from(raw)
        .map_err(|_| serde::de::Error::custom(format!("remaining_hours must be non-negative, got {raw}")))
}

/// A weekly working window for a task's resource.
///
/// `dayofweek` is 0 = Monday .. 6 = Sunday; the window covers hours
/// `[hour_from, hour_to)`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct CalendarSlot {
    pub task_id: i64,
    pub dayofweek: u8,
    pub hour_from: u8,
    pub hour_to: u8,
}

impl CalendarSlot {
    pub fn new(task_id: i64, dayofweek: u8, hour_from: u8, hour_to: u8) -> Self {
        Self {
            task_id,
            dayofweek,
            hour_from,
            hour_to,
        }
    }
}

/// An inclusive date range during which a task's resource is unavailable.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Leave {
    pub task_id: i64,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl Leave {
    pub fn new(task_id: i64, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            task_id,
            date_from,
            date_to,
        }
    }
}

/// One scheduled hour: a chosen candidate slot unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub task_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub hour: u8,
}

/// Per-call parameter overrides; unset fields fall back to the config.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PlanParams {
    /// First day of the planning window; defaults to today.
    pub start_date: Option<NaiveDate>,
    pub initial_horizon_days: Option<u32>,
    pub horizon_extension_factor: Option<f64>,
    pub max_horizon_days: Option<u32>,
    pub ortools_time_limit_seconds: Option<f64>,
    pub ortools_workers: Option<u32>,
    pub hybrid_mode: Option<bool>,
    pub greedy_threshold_tasks: Option<usize>,
    pub greedy_threshold_hours: Option<u64>,
    pub greedy_threshold_users: Option<usize>,
    pub greedy_threshold_avg_hours: Option<f64>,
}

/// One planning call's worth of input.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PlanRequest {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub calendar_slots: Vec<CalendarSlot>,
    #[serde(default)]
    pub leaves: Vec<Leave>,
    #[serde(default)]
    pub params: PlanParams,
}

impl PlanRequest {
    /// Parse a request from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, InputError> {
        let request: Self = serde_json::from_str(raw)?;
        request.validate()?;
        Ok(request)
    }

    /// Check structural integrity of the three tables. Returns the first
    /// violation found; a request that passes is safe to build an index from.
    pub fn validate(&self) -> Result<(), InputError> {
        let mut seen = rustc_hash::FxHashSet::default();
        for task in &self.tasks {
            if !seen.insert(task.id) {
                return Err(InputError::DuplicateTaskId(task.id));
            }
        }

        for slot in &self.calendar_slots {
            if slot.dayofweek > 6 {
                return Err(InputError::DayOfWeekOutOfRange {
                    task_id: slot.task_id,
                    dayofweek: slot.dayofweek,
                });
            }
            if slot.hour_from > 24 || slot.hour_to > 24 {
                return Err(InputError::HourOutOfRange {
                    task_id: slot.task_id,
                    hour_from: slot.hour_from,
                    hour_to: slot.hour_to,
                });
            }
            if slot.hour_from >= slot.hour_to {
                return Err(InputError::EmptyWindow {
                    task_id: slot.task_id,
                    hour_from: slot.hour_from,
                    hour_to: slot.hour_to,
                });
            }
        }

        for leave in &self.leaves {
            if leave.date_from > leave.date_to {
                return Err(InputError::LeaveRange {
                    task_id: leave.task_id,
                    date_from: leave.date_from,
                    date_to: leave.date_to,
                });
            }
        }

        Ok(())
    }
}
