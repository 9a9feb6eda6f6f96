//! Hybrid orchestrator.
//!
//! Classifies the workload and routes it to the greedy scheduler, the
//! horizon-controlled CP scheduler, or the two in sequence (greedy first,
//! then a CP pass over the residual). This is the engine's entry point; the
//! caller hands in the validated request and gets the solution document back.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::config::Config;
use crate::domain::{CandidateIndex, Occupancy};
use crate::logging::RUNS;
use crate::models::{InputError, PlanParams, PlanRequest, Task};
use crate::planlog;
use crate::scheduler::cp::{CpScheduler, SolveStatus, SolverParams};
use crate::scheduler::greedy::GreedyScheduler;
use crate::scheduler::horizon::HorizonController;
use crate::solution::{assemble, Algorithm, PlanDocument, RunSummary};

/// Shape measurements driving algorithm selection.
#[derive(Clone, Copy, Debug)]
struct WorkloadShape {
    tasks: usize,
    total_hours: u64,
    users: usize,
    avg_hours: f64,
}

impl WorkloadShape {
    fn measure(tasks: &[Task]) -> Self {
        let total_hours: u64 = tasks.iter().map(|t| t.remaining_hours as u64).sum();
        let mut users: Vec<i64> = tasks.iter().map(|t| t.user_id).collect();
        users.sort_unstable();
        users.dedup();
        let avg_hours = total_hours as f64 / tasks.len().max(1) as f64;
        Self {
            tasks: tasks.len(),
            total_hours,
            users: users.len(),
            avg_hours,
        }
    }

    /// Greedy wins on any large dimension: many tasks, many hours, many
    /// resources, or very long tasks.
    fn prefers_greedy(&self, config: &Config) -> bool {
        self.tasks > config.greedy_threshold_tasks
            || self.total_hours > config.greedy_threshold_hours
            || self.users > config.greedy_threshold_users
            || self.avg_hours > config.greedy_threshold_avg_hours
    }
}

/// Plan the request. The single public operation of the engine.
///
/// Synchronous; owns all mutable state for the duration of the call. The
/// only error is invalid input; every other condition is reported inside
/// the returned document.
pub fn plan(request: &PlanRequest, config: &Config) -> Result<PlanDocument, InputError> {
    request.validate()?;
    let started = Instant::now();
    let cfg = apply_params(config, &request.params);
    let start_date = request
        .params
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    // Zero-hour tasks have nothing to schedule
    let tasks: Vec<Task> = request
        .tasks
        .iter()
        .filter(|t| t.remaining_hours > 0)
        .cloned()
        .collect();

    let shape = WorkloadShape::measure(&tasks);
    let use_greedy = cfg.hybrid_mode && shape.prefers_greedy(&cfg);
    planlog!(
        cfg.verbosity,
        RUNS,
        "routing: tasks={} hours={} users={} avg={:.1} -> {}",
        shape.tasks,
        shape.total_hours,
        shape.users,
        shape.avg_hours,
        if use_greedy { "greedy" } else { "ortools" }
    );

    if !use_greedy {
        return Ok(run_extended_cp(
            &tasks,
            request,
            &cfg,
            start_date,
            started,
            Algorithm::Ortools,
        ));
    }

    // Greedy-first flow at the initial horizon
    let index = CandidateIndex::build(
        &tasks,
        &request.calendar_slots,
        &request.leaves,
        start_date,
        cfg.initial_horizon_days,
    );
    let mut occupancy = Occupancy::new();
    let greedy = GreedyScheduler::new(cfg.verbosity).schedule(&tasks, &index, &mut occupancy);
    planlog!(
        cfg.verbosity,
        RUNS,
        "greedy: {}/{} tasks fully placed, {} residual",
        greedy.tasks_fully_scheduled,
        greedy.tasks_total,
        greedy.residual.len()
    );

    if greedy.assignments.is_empty() && !tasks.is_empty() {
        // Nothing placed at all; discard and let CP try from scratch
        return Ok(run_extended_cp(
            &tasks,
            request,
            &cfg,
            start_date,
            started,
            Algorithm::OrtoolsFallback,
        ));
    }

    let mut assignments = greedy.assignments;
    let mut algorithm = Algorithm::Greedy;
    let mut objective = None;
    let mut solver_stats = None;

    if !greedy.residual.is_empty() && greedy.residual.len() <= cfg.greedy_residual_limit {
        // CP over the leftover hours only, with the already-taken
        // resource-hours pre-occupied and a shorter deadline
        let residual_tasks: Vec<Task> = greedy
            .residual
            .iter()
            .filter(|(id, _)| !index.is_infeasible(*id))
            .filter_map(|&(id, missing)| {
                tasks.iter().find(|t| t.id == id).map(|t| {
                    let mut rest = t.clone();
                    rest.remaining_hours = missing;
                    rest
                })
            })
            .collect();

        if !residual_tasks.is_empty() {
            let solver = CpScheduler::new(solver_params(&cfg, cfg.fallback_time_limit_seconds));
            let cp = solver.solve(&residual_tasks, &index, &occupancy);
            planlog!(
                cfg.verbosity,
                RUNS,
                "residual cp: {:?}, {} assignments",
                cp.status,
                cp.assignments.len()
            );
            if cp.status.is_solution() && !cp.assignments.is_empty() {
                assignments.extend(cp.assignments);
                algorithm = Algorithm::HybridGreedyOrtools;
                objective = cp.objective;
                solver_stats = Some(cp.stats);
            }
        }
    }

    Ok(assemble(
        &tasks,
        assignments,
        RunSummary {
            algorithm: Some(algorithm),
            solver_status: None,
            objective,
            solve_time: started.elapsed().as_secs_f64(),
            horizon_days: cfg.initial_horizon_days,
            solver_stats,
            ..Default::default()
        },
    ))
}

/// Full CP over all tasks under the horizon controller.
fn run_extended_cp(
    tasks: &[Task],
    request: &PlanRequest,
    cfg: &Config,
    start_date: NaiveDate,
    started: Instant,
    algorithm: Algorithm,
) -> PlanDocument {
    let controller = HorizonController::new(
        CpScheduler::new(solver_params(cfg, cfg.time_limit_seconds)),
        cfg.initial_horizon_days,
        cfg.horizon_extension_factor,
        cfg.max_horizon_days,
        cfg.verbosity,
    );
    let outcome = controller.solve(
        tasks,
        &request.calendar_slots,
        &request.leaves,
        start_date,
    );

    let diagnostic = match outcome.cp.status {
        SolveStatus::ModelInvalid => Some("solver reported MODEL_INVALID".to_string()),
        SolveStatus::Unknown if !outcome.capped => {
            Some("solver returned UNKNOWN".to_string())
        }
        _ => None,
    };

    assemble(
        tasks,
        outcome.cp.assignments,
        RunSummary {
            algorithm: Some(algorithm),
            solver_status: Some(outcome.cp.status),
            capped: outcome.capped,
            timed_out: outcome.capped && outcome.cp.status == SolveStatus::Unknown,
            objective: outcome.cp.objective,
            solve_time: started.elapsed().as_secs_f64(),
            horizon_days: outcome.horizon_days,
            solver_stats: Some(outcome.cp.stats),
            diagnostic,
        },
    )
}

fn solver_params(cfg: &Config, time_limit_seconds: f64) -> SolverParams {
    SolverParams {
        time_limit: Duration::from_secs_f64(time_limit_seconds.max(0.0)),
        workers: cfg.workers,
        log_progress: cfg.log_progress,
        verbosity: cfg.verbosity,
    }
}

/// Per-call parameter overrides on top of the ambient config.
fn apply_params(config: &Config, params: &PlanParams) -> Config {
    let mut cfg = config.clone();
    if let Some(days) = params.initial_horizon_days {
        cfg.initial_horizon_days = days;
    }
    if let Some(factor) = params.horizon_extension_factor {
        cfg.horizon_extension_factor = factor;
    }
    if let Some(days) = params.max_horizon_days {
        cfg.max_horizon_days = days;
    }
    if let Some(limit) = params.ortools_time_limit_seconds {
        cfg.time_limit_seconds = limit;
    }
    if let Some(workers) = params.ortools_workers {
        cfg.workers = workers;
    }
    if let Some(hybrid) = params.hybrid_mode {
        cfg.hybrid_mode = hybrid;
    }
    if let Some(n) = params.greedy_threshold_tasks {
        cfg.greedy_threshold_tasks = n;
    }
    if let Some(hours) = params.greedy_threshold_hours {
        cfg.greedy_threshold_hours = hours;
    }
    if let Some(users) = params.greedy_threshold_users {
        cfg.greedy_threshold_users = users;
    }
    if let Some(avg) = params.greedy_threshold_avg_hours {
        cfg.greedy_threshold_avg_hours = avg;
    }
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarSlot, Leave};
    use crate::solution::PlanStatus;
    use rustc_hash::FxHashSet;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    // 2025-03-03 is a Monday
    fn monday() -> NaiveDate {
        d(2025, 3, 3)
    }

    fn base_params() -> PlanParams {
        PlanParams {
            start_date: Some(monday()),
            ortools_workers: Some(1),
            ..Default::default()
        }
    }

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_single_task_single_window() {
        let request = PlanRequest {
            tasks: vec![Task::new(1, "a", 1, 3)],
            calendar_slots: vec![CalendarSlot::new(1, 0, 9, 17)],
            leaves: vec![],
            params: base_params(),
        };
        let document = plan(&request, &config()).unwrap();

        assert_eq!(document.status, PlanStatus::Optimal);
        assert_eq!(document.horizon_days, 28);
        assert_eq!(document.algorithm_used, Algorithm::Ortools);
        let slots = &document.tasks[&1];
        let picked: Vec<(NaiveDate, u8)> = slots.iter().map(|s| (s.date, s.hour)).collect();
        assert_eq!(picked, vec![(monday(), 9), (monday(), 10), (monday(), 11)]);
    }

    #[test]
    fn test_leave_pushes_work_to_next_calendar_day() {
        let request = PlanRequest {
            tasks: vec![Task::new(1, "a", 1, 3)],
            calendar_slots: vec![
                CalendarSlot::new(1, 0, 9, 17),
                CalendarSlot::new(1, 1, 9, 17),
            ],
            leaves: vec![Leave::new(1, monday(), monday())],
            params: base_params(),
        };
        let document = plan(&request, &config()).unwrap();

        let tuesday = d(2025, 3, 4);
        let picked: Vec<(NaiveDate, u8)> =
            document.tasks[&1].iter().map(|s| (s.date, s.hour)).collect();
        assert_eq!(picked, vec![(tuesday, 9), (tuesday, 10), (tuesday, 11)]);
    }

    #[test]
    fn test_priority_contention_on_shared_resource() {
        let request = PlanRequest {
            tasks: vec![
                Task::new(1, "low", 1, 2).with_priority(30.0),
                Task::new(2, "high", 1, 2).with_priority(90.0),
            ],
            calendar_slots: vec![
                CalendarSlot::new(1, 0, 9, 11),
                CalendarSlot::new(2, 0, 9, 11),
            ],
            leaves: vec![],
            params: base_params(),
        };
        let document = plan(&request, &config()).unwrap();

        assert!(document.status.is_solution());
        let high: Vec<(NaiveDate, u8)> =
            document.tasks[&2].iter().map(|s| (s.date, s.hour)).collect();
        assert_eq!(high, vec![(monday(), 9), (monday(), 10)]);
        // The low-priority task overflows to the following Monday
        let low: Vec<(NaiveDate, u8)> =
            document.tasks[&1].iter().map(|s| (s.date, s.hour)).collect();
        assert_eq!(low, vec![(d(2025, 3, 10), 9), (d(2025, 3, 10), 10)]);
    }

    #[test]
    fn test_horizon_extension_for_long_task() {
        let request = PlanRequest {
            tasks: vec![Task::new(1, "long", 1, 40)],
            calendar_slots: vec![CalendarSlot::new(1, 0, 9, 17)],
            leaves: vec![],
            params: base_params(),
        };
        let document = plan(&request, &config()).unwrap();

        assert!(document.status.is_solution());
        assert!(document.horizon_days >= 35);
        assert_eq!(document.tasks[&1].len(), 40);
    }

    #[test]
    fn test_structurally_infeasible_task_yields_partial() {
        let request = PlanRequest {
            tasks: vec![Task::new(1, "ok", 1, 2), Task::new(2, "stuck", 2, 2)],
            calendar_slots: vec![CalendarSlot::new(1, 0, 9, 17)],
            leaves: vec![],
            params: base_params(),
        };
        let document = plan(&request, &config()).unwrap();

        assert_eq!(document.status, PlanStatus::Partial);
        assert_eq!(document.tasks[&1].len(), 2);
        assert!(!document.tasks.contains_key(&2));
        assert_eq!(document.unscheduled_tasks, vec![2]);
    }

    #[test]
    fn test_large_workload_routes_to_greedy() {
        // 60 tasks, 12 resources, 5 hours each: over the task and user
        // thresholds
        let tasks: Vec<Task> = (0..60)
            .map(|i| Task::new(i, format!("t{i}"), i % 12, 5).with_priority((i % 10) as f64 * 10.0))
            .collect();
        let calendar_slots: Vec<CalendarSlot> = (0..60)
            .flat_map(|i| (0..5).map(move |dow| CalendarSlot::new(i, dow, 9, 17)))
            .collect();
        let request = PlanRequest {
            tasks,
            calendar_slots,
            leaves: vec![],
            params: base_params(),
        };
        let document = plan(&request, &config()).unwrap();

        assert!(matches!(
            document.algorithm_used,
            Algorithm::Greedy | Algorithm::HybridGreedyOrtools
        ));
        assert!(document.status.is_solution());

        // Exclusivity and hour-count invariants hold on the merged schedule
        let mut seen: FxHashSet<(i64, NaiveDate, u8)> = FxHashSet::default();
        for (&task_id, slots) in &document.tasks {
            assert!(slots.len() <= 5, "task {task_id} overbooked");
            let user = (task_id % 12) as i64;
            for slot in slots {
                assert!(
                    seen.insert((user, slot.date, slot.hour)),
                    "resource-hour double-booked"
                );
            }
        }
    }

    #[test]
    fn test_hybrid_mode_off_forces_cp() {
        let tasks: Vec<Task> = (0..60)
            .map(|i| Task::new(i, format!("t{i}"), i % 12, 1))
            .collect();
        let calendar_slots: Vec<CalendarSlot> = (0..60)
            .flat_map(|i| (0..5).map(move |dow| CalendarSlot::new(i, dow, 9, 17)))
            .collect();
        let request = PlanRequest {
            tasks,
            calendar_slots,
            leaves: vec![],
            params: PlanParams {
                hybrid_mode: Some(false),
                ..base_params()
            },
        };
        let document = plan(&request, &config()).unwrap();
        assert_eq!(document.algorithm_used, Algorithm::Ortools);
    }

    #[test]
    fn test_zero_hour_request_is_optimal_and_empty() {
        // Feeding back a solved schedule: same tasks, nothing left to plan
        let request = PlanRequest {
            tasks: vec![Task::new(1, "done", 1, 0), Task::new(2, "done too", 2, 0)],
            calendar_slots: vec![CalendarSlot::new(1, 0, 9, 17)],
            leaves: vec![],
            params: base_params(),
        };
        let document = plan(&request, &config()).unwrap();

        assert_eq!(document.status, PlanStatus::Optimal);
        assert!(document.tasks.is_empty());
        assert_eq!(document.completeness, 1.0);
    }

    #[test]
    fn test_invalid_input_is_the_only_error() {
        let request = PlanRequest {
            tasks: vec![Task::new(1, "a", 1, 2)],
            calendar_slots: vec![CalendarSlot::new(1, 9, 9, 17)],
            leaves: vec![],
            params: base_params(),
        };
        assert!(plan(&request, &config()).is_err());
    }

    #[test]
    fn test_plan_deterministic_with_single_worker() {
        let tasks: Vec<Task> = (0..8)
            .map(|i| Task::new(i, format!("t{i}"), i % 2, 4).with_priority((i * 13 % 60) as f64))
            .collect();
        let calendar_slots: Vec<CalendarSlot> = (0..8)
            .flat_map(|i| {
                vec![CalendarSlot::new(i, 0, 9, 14), CalendarSlot::new(i, 3, 9, 14)]
            })
            .collect();
        let request = PlanRequest {
            tasks,
            calendar_slots,
            leaves: vec![],
            params: base_params(),
        };

        let first = plan(&request, &config()).unwrap();
        let second = plan(&request, &config()).unwrap();
        assert_eq!(first.tasks, second.tasks);
        assert_eq!(first.status, second.status);
        assert_eq!(first.objective_value, second.objective_value);
    }
}
