//! Horizon auto-extension around the CP scheduler.
//!
//! Constraints are never relaxed; when the solver reports no solution the
//! planning window grows by a configurable factor and the candidate index is
//! rebuilt, until a solution is found or the hard cap is passed.

use chrono::NaiveDate;

use crate::domain::{CandidateIndex, Occupancy};
use crate::logging::RUNS;
use crate::models::{CalendarSlot, Leave, Task};
use crate::planlog;
use crate::scheduler::cp::{CpOutcome, CpScheduler, SolveStatus};

/// Result of a horizon-controlled solve.
#[derive(Debug)]
pub struct HorizonOutcome {
    pub cp: CpOutcome,
    /// Final horizon used (or attempted, when capped).
    pub horizon_days: u32,
    pub extensions: u32,
    /// Tasks with no candidate slot at the final horizon.
    pub infeasible_tasks: Vec<i64>,
    /// True when the cap was passed without a solution.
    pub capped: bool,
}

/// Re-runs the CP scheduler on a growing window.
pub struct HorizonController {
    solver: CpScheduler,
    initial_horizon_days: u32,
    extension_factor: f64,
    max_horizon_days: u32,
    verbosity: u8,
}

impl HorizonController {
    pub fn new(
        solver: CpScheduler,
        initial_horizon_days: u32,
        extension_factor: f64,
        max_horizon_days: u32,
        verbosity: u8,
    ) -> Self {
        Self {
            solver,
            initial_horizon_days,
            extension_factor,
            max_horizon_days,
            verbosity,
        }
    }

    /// Solve, extending the horizon on `INFEASIBLE`/`UNKNOWN` until a
    /// solution is found or the cap is exceeded.
    ///
    /// Tasks with no candidates at the current horizon are excluded from the
    /// model (they cannot make it infeasible) and reported in the outcome;
    /// they never trigger an extension on their own.
    pub fn solve(
        &self,
        tasks: &[Task],
        calendar_slots: &[CalendarSlot],
        leaves: &[Leave],
        start_date: NaiveDate,
    ) -> HorizonOutcome {
        let mut horizon = self.initial_horizon_days.max(1);
        let mut extensions = 0u32;

        loop {
            let index =
                CandidateIndex::build(tasks, calendar_slots, leaves, start_date, horizon);
            let feasible: Vec<Task> = tasks
                .iter()
                .filter(|t| !index.is_infeasible(t.id))
                .cloned()
                .collect();
            let cp = self.solver.solve(&feasible, &index, &Occupancy::new());

            match cp.status {
                SolveStatus::Optimal | SolveStatus::Feasible => {
                    planlog!(
                        self.verbosity,
                        RUNS,
                        "horizon: solved at {} days after {} extension(s)",
                        horizon,
                        extensions
                    );
                    return HorizonOutcome {
                        cp,
                        horizon_days: horizon,
                        extensions,
                        infeasible_tasks: index.infeasible,
                        capped: false,
                    };
                }
                SolveStatus::ModelInvalid => {
                    // Internal error; extending the window cannot fix it
                    return HorizonOutcome {
                        cp,
                        horizon_days: horizon,
                        extensions,
                        infeasible_tasks: index.infeasible,
                        capped: false,
                    };
                }
                SolveStatus::Infeasible | SolveStatus::Unknown => {
                    let next = next_horizon(horizon, self.extension_factor);
                    if next > self.max_horizon_days {
                        planlog!(
                            self.verbosity,
                            RUNS,
                            "horizon: no solution within cap ({} days)",
                            self.max_horizon_days
                        );
                        return HorizonOutcome {
                            cp,
                            horizon_days: horizon,
                            extensions,
                            infeasible_tasks: index.infeasible,
                            capped: true,
                        };
                    }
                    planlog!(
                        self.verbosity,
                        RUNS,
                        "horizon: {:?} at {} days, extending to {}",
                        cp.status,
                        horizon,
                        next
                    );
                    horizon = next;
                    extensions += 1;
                }
            }
        }
    }
}

/// Grow the horizon by the factor, by at least one day so factors near 1.0
/// still terminate.
fn next_horizon(horizon: u32, factor: f64) -> u32 {
    let scaled = (horizon as f64 * factor).ceil() as u32;
    scaled.max(horizon + 1)
}
