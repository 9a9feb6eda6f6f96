//! Greedy constructive scheduler.
//!
//! Walks tasks in priority order and packs each hour unit into the earliest
//! free candidate slot. Fast, deterministic, and never violates resource
//! exclusivity; completeness is not guaranteed and the shortfall is reported
//! as a residual for the CP pass to pick up.

use std::cmp::Ordering;

use crate::domain::{CandidateIndex, Occupancy};
use crate::logging::TASKS;
use crate::models::{Assignment, Task};
use crate::planlog;

/// Result of one greedy pass.
#[derive(Clone, Debug, Default)]
pub struct GreedyOutcome {
    pub assignments: Vec<Assignment>,
    /// Tasks left with unplaced hours: (task_id, hours still needed).
    pub residual: Vec<(i64, u32)>,
    pub tasks_total: usize,
    pub tasks_fully_scheduled: usize,
}

impl GreedyOutcome {
    /// Fraction of tasks that were fully placed.
    pub fn success_rate(&self) -> f64 {
        if self.tasks_total == 0 {
            1.0
        } else {
            self.tasks_fully_scheduled as f64 / self.tasks_total as f64
        }
    }
}

/// Priority-ordered earliest-slot scheduler.
pub struct GreedyScheduler {
    verbosity: u8,
}

impl GreedyScheduler {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    /// Assign each task's hour units to its earliest free candidate slots.
    ///
    /// Tasks are processed by `priority_score` descending, ties broken by
    /// `task_id` ascending; within a task, candidates are consumed in
    /// `(date, hour)` ascending order. `occupancy` is shared state: slots
    /// taken here are unavailable to any later pass, and slots already taken
    /// by an earlier pass are skipped.
    pub fn schedule(
        &self,
        tasks: &[Task],
        index: &CandidateIndex,
        occupancy: &mut Occupancy,
    ) -> GreedyOutcome {
        let mut order: Vec<&Task> = tasks.iter().filter(|t| t.remaining_hours > 0).collect();
        order.sort_by(|a, b| priority_order(a, b));

        let mut outcome = GreedyOutcome {
            tasks_total: order.len(),
            ..Default::default()
        };

        for task in order {
            let mut needed = task.remaining_hours;

            for &(date, hour) in index.candidates(task.id) {
                if needed == 0 {
                    break;
                }
                if occupancy.take(task.user_id, date, hour) {
                    outcome.assignments.push(Assignment {
                        task_id: task.id,
                        user_id: task.user_id,
                        date,
                        hour,
                    });
                    needed -= 1;
                }
            }

            if needed == 0 {
                outcome.tasks_fully_scheduled += 1;
                planlog!(
                    self.verbosity,
                    TASKS,
                    "  greedy: task {} placed {}h",
                    task.id,
                    task.remaining_hours
                );
            } else {
                planlog!(
                    self.verbosity,
                    TASKS,
                    "  greedy: task {} short by {}h (candidates exhausted)",
                    task.id,
                    needed
                );
                outcome.residual.push((task.id, needed));
            }
        }

        outcome
    }
}

/// Priority descending, then task id ascending for determinism.
fn priority_order(a: &Task, b: &Task) -> Ordering {
    b.priority_score
        .partial_cmp(&a.priority_score)
        .unwrap_or(Ordering::Equal)
        .then(a.id.cmp(&b.id))
}
