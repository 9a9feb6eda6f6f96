//! Boolean-model CP scheduler.
//!
//! The model mirrors the hour-grid formulation: one Boolean per candidate
//! `(task, date, hour)` slot unit, an hour-count equality per task, an
//! at-most-one constraint per resource-hour, and auxiliary day Booleans whose
//! sum (total task-days used) is the minimization objective.
//!
//! The solver is in-crate. Feasibility is decided exactly by augmenting-path
//! matching of task hour units into resource-hour cells; the day objective is
//! then driven down by evicting lightly-used days, optionally from several
//! deterministic seeds in parallel worker threads. A per-task lower bound on
//! the reachable day count certifies optimality.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::domain::{CandidateIndex, Occupancy};
use crate::logging::TRACE;
use crate::models::{Assignment, Task};
use crate::planlog;

/// Terminal state of one solve call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Complete assignment, day count proven minimal.
    Optimal,
    /// Complete assignment within the time limit, optimality not proven.
    Feasible,
    /// No complete assignment exists at this horizon.
    Infeasible,
    /// The model itself is malformed (empty demand, unknown task).
    ModelInvalid,
    /// The deadline expired before feasibility was decided.
    Unknown,
}

impl SolveStatus {
    pub fn is_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Solver knobs, per invocation.
#[derive(Clone, Debug)]
pub struct SolverParams {
    pub time_limit: Duration,
    pub workers: u32,
    pub log_progress: bool,
    pub verbosity: u8,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(30),
            workers: 4,
            log_progress: false,
            verbosity: 0,
        }
    }
}

/// Search counters, reported alongside the solution.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SolverStats {
    pub wall_time: f64,
    /// Augmenting-path searches performed.
    pub branches: u64,
    /// Failed searches and rejected improvement moves.
    pub conflicts: u64,
    /// Slot Booleans plus day Booleans.
    pub booleans: usize,
    pub constraints: usize,
}

/// Result of one CP solve.
#[derive(Clone, Debug)]
pub struct CpOutcome {
    pub status: SolveStatus,
    pub assignments: Vec<Assignment>,
    /// Total task-days used, when a solution was found.
    pub objective: Option<i64>,
    pub stats: SolverStats,
}

impl CpOutcome {
    fn no_solution(status: SolveStatus, stats: SolverStats) -> Self {
        Self {
            status,
            assignments: Vec::new(),
            objective: None,
            stats,
        }
    }
}

/// One candidate slot unit in the dense model.
#[derive(Clone, Copy, Debug)]
struct Slot {
    task: u32,
    date: NaiveDate,
    hour: u8,
}

/// The Boolean model: dense slot vector with per-task ranges and one
/// capacity-one cell per resource-hour.
struct SlotModel {
    slots: Vec<Slot>,
    /// Per task: half-open range into `slots`, chronological within a task.
    task_slots: Vec<(usize, usize)>,
    demands: Vec<u32>,
    /// slot index -> cell index; cells are distinct (user, date, hour).
    slot_cell: Vec<u32>,
    cell_count: usize,
    /// Constraint/variable tallies for statistics.
    booleans: usize,
    constraints: usize,
}

impl SlotModel {
    /// Assemble the model from the candidate index, excluding pre-occupied
    /// resource-hours. Returns `None` for a malformed input (zero-demand or
    /// candidate-free task), which the caller reports as `MODEL_INVALID`.
    fn build(tasks: &[Task], index: &CandidateIndex, occupancy: &Occupancy) -> Option<Self> {
        let mut slots = Vec::new();
        let mut task_slots = Vec::with_capacity(tasks.len());
        let mut demands = Vec::with_capacity(tasks.len());
        let mut slot_cell = Vec::new();
        let mut cells: FxHashMap<(i64, NaiveDate, u8), u32> = FxHashMap::default();
        let mut day_vars = 0usize;
        let mut exclusive_cells = 0usize;
        let mut cell_sizes: Vec<u32> = Vec::new();

        for (task_idx, task) in tasks.iter().enumerate() {
            if task.remaining_hours == 0 || index.is_infeasible(task.id) {
                return None;
            }
            let begin = slots.len();
            let mut last_date: Option<NaiveDate> = None;
            for &(date, hour) in index.candidates(task.id) {
                if !occupancy.is_free(task.user_id, date, hour) {
                    continue;
                }
                slots.push(Slot {
                    task: task_idx as u32,
                    date,
                    hour,
                });
                if last_date != Some(date) {
                    day_vars += 1;
                    last_date = Some(date);
                }
                let next_id = cells.len() as u32;
                let cell = *cells.entry((task.user_id, date, hour)).or_insert(next_id);
                if (cell as usize) == cell_sizes.len() {
                    cell_sizes.push(0);
                }
                cell_sizes[cell as usize] += 1;
                if cell_sizes[cell as usize] == 2 {
                    exclusive_cells += 1;
                }
                slot_cell.push(cell);
            }
            task_slots.push((begin, slots.len()));
            demands.push(task.remaining_hours);
        }

        let booleans = slots.len() + day_vars;
        // hour-count equalities + at-most-one per contended cell + two
        // linkage inequalities per day Boolean
        let constraints = tasks.len() + exclusive_cells + 2 * day_vars;

        Some(Self {
            slots,
            task_slots,
            demands,
            slot_cell,
            cell_count: cells.len(),
            booleans,
            constraints,
        })
    }

    /// Sum over tasks of the fewest days that could ever cover the demand,
    /// ignoring cross-task contention. A valid lower bound on the objective.
    fn day_lower_bound(&self) -> i64 {
        let mut bound = 0i64;
        for (task_idx, &(begin, end)) in self.task_slots.iter().enumerate() {
            let mut per_day: FxHashMap<NaiveDate, u32> = FxHashMap::default();
            for slot in &self.slots[begin..end] {
                *per_day.entry(slot.date).or_insert(0) += 1;
            }
            let mut capacities: Vec<u32> = per_day.into_values().collect();
            capacities.sort_unstable_by(|a, b| b.cmp(a));
            let mut remaining = self.demands[task_idx];
            for capacity in capacities {
                if remaining == 0 {
                    break;
                }
                bound += 1;
                remaining = remaining.saturating_sub(capacity);
            }
        }
        bound
    }
}

/// A complete or partial matching of hour units to cells: the Boolean values
/// of the model, stored parallel to its slot vector.
#[derive(Clone)]
struct Matching {
    chosen: Vec<bool>,
    cell_owner: Vec<Option<u32>>,
    assigned: Vec<u32>,
}

impl Matching {
    fn new(model: &SlotModel) -> Self {
        Self {
            chosen: vec![false; model.slots.len()],
            cell_owner: vec![None; model.cell_count],
            assigned: vec![0; model.demands.len()],
        }
    }

    fn claim(&mut self, cell: u32, slot: u32) {
        self.cell_owner[cell as usize] = Some(slot);
        self.chosen[slot as usize] = true;
    }

    fn is_complete(&self, model: &SlotModel) -> bool {
        self.assigned
            .iter()
            .zip(&model.demands)
            .all(|(have, want)| have == want)
    }

    /// Distinct (task, date) pairs in use: the objective value.
    fn day_count(&self, model: &SlotModel) -> i64 {
        let mut days = 0i64;
        for &(begin, end) in &model.task_slots {
            let mut last: Option<NaiveDate> = None;
            for idx in begin..end {
                if self.chosen[idx] && last != Some(model.slots[idx].date) {
                    days += 1;
                    last = Some(model.slots[idx].date);
                }
            }
        }
        days
    }
}

/// Boolean-model scheduler with augmenting-path search.
pub struct CpScheduler {
    params: SolverParams,
}

impl CpScheduler {
    pub fn new(params: SolverParams) -> Self {
        Self { params }
    }

    /// Solve for the given tasks against the candidate index.
    ///
    /// `tasks` must contain only tasks with `remaining_hours > 0` and a
    /// non-empty candidate list; resource-hours in `occupancy` are treated
    /// as unavailable. Either every task ends fully assigned or the call
    /// reports a no-solution status.
    pub fn solve(
        &self,
        tasks: &[Task],
        index: &CandidateIndex,
        occupancy: &Occupancy,
    ) -> CpOutcome {
        let started = Instant::now();
        let deadline = started + self.params.time_limit;
        let verbosity = if self.params.log_progress {
            self.params.verbosity.max(TRACE)
        } else {
            self.params.verbosity
        };
        let mut stats = SolverStats::default();

        if tasks.is_empty() {
            stats.wall_time = started.elapsed().as_secs_f64();
            return CpOutcome {
                status: SolveStatus::Optimal,
                assignments: Vec::new(),
                objective: Some(0),
                stats,
            };
        }

        let model = match SlotModel::build(tasks, index, occupancy) {
            Some(model) => model,
            None => {
                stats.wall_time = started.elapsed().as_secs_f64();
                return CpOutcome::no_solution(SolveStatus::ModelInvalid, stats);
            }
        };
        stats.booleans = model.booleans;
        stats.constraints = model.constraints;
        planlog!(
            verbosity,
            TRACE,
            "cp: {} slot vars, {} cells, {} constraints",
            model.slots.len(),
            model.cell_count,
            model.constraints
        );

        // Fast infeasibility check before any search
        for (task_idx, &(begin, end)) in model.task_slots.iter().enumerate() {
            if (end - begin) < model.demands[task_idx] as usize {
                stats.wall_time = started.elapsed().as_secs_f64();
                return CpOutcome::no_solution(SolveStatus::Infeasible, stats);
            }
        }

        // Feasibility: saturate every task's demand via augmenting paths
        let mut matching = Matching::new(&model);
        let order = priority_order(tasks);
        seed(&model, &mut matching, &order);

        for &task_idx in &order {
            while matching.assigned[task_idx] < model.demands[task_idx] {
                if Instant::now() >= deadline {
                    stats.wall_time = started.elapsed().as_secs_f64();
                    return CpOutcome::no_solution(SolveStatus::Unknown, stats);
                }
                stats.branches += 1;
                let mut visited = vec![false; model.cell_count];
                if augment(&model, &mut matching, task_idx, &mut visited) {
                    matching.assigned[task_idx] += 1;
                } else {
                    stats.conflicts += 1;
                    stats.wall_time = started.elapsed().as_secs_f64();
                    return CpOutcome::no_solution(SolveStatus::Infeasible, stats);
                }
            }
        }
        debug_assert!(matching.is_complete(&model));

        // Objective: minimize total task-days by evicting lightly-used days
        let lower_bound = model.day_lower_bound();
        let workers = self.params.workers.max(1);
        let mut best = matching.clone();
        let mut best_days = best.day_count(&model);
        let mut conflicts = 0u64;

        if best_days > lower_bound && workers == 1 {
            conflicts += improve(&model, &mut best, 0, deadline, lower_bound);
            best_days = best.day_count(&model);
        } else if best_days > lower_bound {
            let results = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..workers)
                    .map(|worker| {
                        let model = &model;
                        let seed_matching = matching.clone();
                        scope.spawn(move || {
                            let mut local = seed_matching;
                            let moves = improve(model, &mut local, worker as u64, deadline, lower_bound);
                            let days = local.day_count(model);
                            (local, days, moves)
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join())
                    .collect::<Vec<_>>()
            });
            // Joined in worker order: ties resolve to the lowest index
            for joined in results.into_iter().flatten() {
                let (candidate, days, moves) = joined;
                conflicts += moves;
                if days < best_days {
                    best = candidate;
                    best_days = days;
                }
            }
        }
        stats.conflicts += conflicts;

        let status = if best_days <= lower_bound {
            SolveStatus::Optimal
        } else {
            SolveStatus::Feasible
        };
        planlog!(
            verbosity,
            TRACE,
            "cp: {} with {} task-days (lower bound {})",
            if status == SolveStatus::Optimal { "optimal" } else { "feasible" },
            best_days,
            lower_bound
        );

        let mut assignments = Vec::with_capacity(model.slots.len());
        for (task_idx, &(begin, end)) in model.task_slots.iter().enumerate() {
            for idx in begin..end {
                if best.chosen[idx] {
                    let slot = model.slots[idx];
                    assignments.push(Assignment {
                        task_id: tasks[task_idx].id,
                        user_id: tasks[task_idx].user_id,
                        date: slot.date,
                        hour: slot.hour,
                    });
                }
            }
        }

        stats.wall_time = started.elapsed().as_secs_f64();
        CpOutcome {
            status,
            assignments,
            objective: Some(best_days),
            stats,
        }
    }
}

/// Task indices by priority descending, id ascending.
fn priority_order(tasks: &[Task]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&a, &b| {
        tasks[b]
            .priority_score
            .partial_cmp(&tasks[a].priority_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(tasks[a].id.cmp(&tasks[b].id))
    });
    order
}

/// Initial assignment: earliest free cells, tasks in priority order.
fn seed(model: &SlotModel, matching: &mut Matching, order: &[usize]) {
    for &task_idx in order {
        let (begin, end) = model.task_slots[task_idx];
        for idx in begin..end {
            if matching.assigned[task_idx] == model.demands[task_idx] {
                break;
            }
            let cell = model.slot_cell[idx];
            if matching.cell_owner[cell as usize].is_none() {
                matching.claim(cell, idx as u32);
                matching.assigned[task_idx] += 1;
            }
        }
    }
}

/// Find an augmenting path giving `task` one more hour unit. Standard
/// alternating search: take a free cell, or displace an owner that can
/// relocate. Counts are the caller's responsibility.
fn augment(model: &SlotModel, matching: &mut Matching, task: usize, visited: &mut [bool]) -> bool {
    let (begin, end) = model.task_slots[task];
    for idx in begin..end {
        if matching.chosen[idx] {
            continue;
        }
        let cell = model.slot_cell[idx];
        if visited[cell as usize] {
            continue;
        }
        visited[cell as usize] = true;
        match matching.cell_owner[cell as usize] {
            None => {
                matching.claim(cell, idx as u32);
                return true;
            }
            Some(owner) => {
                let owner_task = model.slots[owner as usize].task as usize;
                if augment(model, matching, owner_task, visited) {
                    matching.chosen[owner as usize] = false;
                    matching.claim(cell, idx as u32);
                    return true;
                }
            }
        }
    }
    false
}

/// Day-eviction descent: repeatedly move every hour a task has on one day
/// into free candidate cells on days the task already uses. Monotone in the
/// objective; stops at the lower bound, the deadline, or a fixed point.
/// Returns the number of rejected moves.
fn improve(
    model: &SlotModel,
    matching: &mut Matching,
    seed: u64,
    deadline: Instant,
    lower_bound: i64,
) -> u64 {
    let mut rejected = 0u64;
    let mut rng = Xorshift::new(0x5107_a1ed ^ (seed.wrapping_mul(0x9e37_79b9) + 1));
    let mut days = matching.day_count(model);

    loop {
        if days <= lower_bound || Instant::now() >= deadline {
            break;
        }
        let mut improved = false;

        let mut task_order: Vec<usize> = (0..model.task_slots.len()).collect();
        if seed > 0 {
            rng.shuffle(&mut task_order);
        }

        for &task_idx in &task_order {
            if Instant::now() >= deadline {
                break;
            }
            if try_evict_day(model, matching, task_idx) {
                improved = true;
                days -= 1;
                if days <= lower_bound {
                    break;
                }
            } else {
                rejected += 1;
            }
        }

        if !improved {
            break;
        }
    }
    rejected
}

/// Try to free the lightest-used day of one task by relocating its hours
/// into spare capacity on the task's other used days.
fn try_evict_day(model: &SlotModel, matching: &mut Matching, task: usize) -> bool {
    let (begin, end) = model.task_slots[task];

    // Chosen slots per used day, plus free candidate cells per day
    let mut used: FxHashMap<NaiveDate, Vec<usize>> = FxHashMap::default();
    let mut spare: FxHashMap<NaiveDate, Vec<usize>> = FxHashMap::default();
    for idx in begin..end {
        if matching.chosen[idx] {
            used.entry(model.slots[idx].date).or_default().push(idx);
        } else if matching.cell_owner[model.slot_cell[idx] as usize].is_none() {
            spare.entry(model.slots[idx].date).or_default().push(idx);
        }
    }
    if used.len() < 2 {
        return false;
    }

    // Lightest day first; ties broken by latest date so early days survive
    let mut victims: Vec<(&NaiveDate, &Vec<usize>)> = used.iter().collect();
    victims.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(a.0)));

    for (victim_date, victim_slots) in victims {
        let mut targets: Vec<usize> = used
            .keys()
            .filter(|date| *date != victim_date)
            .flat_map(|date| spare.get(date).into_iter().flatten().copied())
            .collect();
        if targets.len() < victim_slots.len() {
            continue;
        }
        targets.sort_unstable();

        for (&from, &to) in victim_slots.iter().zip(&targets) {
            let from_cell = model.slot_cell[from] as usize;
            matching.chosen[from] = false;
            matching.cell_owner[from_cell] = None;
            matching.claim(model.slot_cell[to], to as u32);
        }
        return true;
    }
    false
}

/// Small deterministic PRNG for worker-local move ordering.
struct Xorshift(u64);

impl Xorshift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalendarSlot;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    // 2025-03-03 is a Monday
    fn monday() -> NaiveDate {
        d(2025, 3, 3)
    }

    fn solve(tasks: &[Task], slots: &[CalendarSlot], horizon: u32) -> CpOutcome {
        let index = CandidateIndex::build(tasks, slots, &[], monday(), horizon);
        let occupancy = Occupancy::new();
        let params = SolverParams {
            workers: 1,
            ..Default::default()
        };
        CpScheduler::new(params).solve(tasks, &index, &occupancy)
    }

    #[test]
    fn test_single_task_single_window_is_optimal() {
        let tasks = vec![Task::new(1, "a", 1, 3)];
        let slots = vec![CalendarSlot::new(1, 0, 9, 17)];
        let outcome = solve(&tasks, &slots, 28);

        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(1));
        let picked: Vec<(NaiveDate, u8)> =
            outcome.assignments.iter().map(|a| (a.date, a.hour)).collect();
        assert_eq!(picked, vec![(monday(), 9), (monday(), 10), (monday(), 11)]);
    }

    #[test]
    fn test_contention_displaces_via_augmenting_path() {
        // Task 1 can only work Monday 9-11; task 2 can work Monday or Tuesday.
        // If task 2 grabs Monday first, the matching must reroute it.
        let tasks = vec![
            Task::new(1, "narrow", 1, 2).with_priority(10.0),
            Task::new(2, "wide", 1, 2).with_priority(90.0),
        ];
        let slots = vec![
            CalendarSlot::new(1, 0, 9, 11),
            CalendarSlot::new(2, 0, 9, 11),
            CalendarSlot::new(2, 1, 9, 11),
        ];
        let outcome = solve(&tasks, &slots, 7);

        assert!(outcome.status.is_solution());
        let count =
            |id: i64| outcome.assignments.iter().filter(|a| a.task_id == id).count();
        assert_eq!(count(1), 2);
        assert_eq!(count(2), 2);

        // Exclusivity: no resource-hour double-booked
        let mut seen = rustc_hash::FxHashSet::default();
        for a in &outcome.assignments {
            assert!(seen.insert((a.user_id, a.date, a.hour)));
        }
    }

    #[test]
    fn test_infeasible_when_demand_exceeds_capacity() {
        // 10 hours wanted, one 3-hour window per week, 7-day horizon
        let tasks = vec![Task::new(1, "a", 1, 10)];
        let slots = vec![CalendarSlot::new(1, 0, 9, 12)];
        let outcome = solve(&tasks, &slots, 7);

        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(outcome.assignments.is_empty());
        assert!(outcome.objective.is_none());
    }

    #[test]
    fn test_infeasible_under_shared_resource_contention() {
        // Two tasks, same resource, both need the full 2-hour Monday window
        let tasks = vec![Task::new(1, "a", 1, 2), Task::new(2, "b", 1, 2)];
        let slots = vec![CalendarSlot::new(1, 0, 9, 11), CalendarSlot::new(2, 0, 9, 11)];
        let outcome = solve(&tasks, &slots, 7);
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_dispersion_objective_concentrates_days() {
        // 4 hours across two weeks of Mon+Tue 9-11 windows: a careless
        // matching could use 2h on each of two days per week; the objective
        // wants as few days as possible. 4h fit into two full days.
        let tasks = vec![Task::new(1, "a", 1, 4)];
        let slots = vec![CalendarSlot::new(1, 0, 9, 11), CalendarSlot::new(1, 1, 9, 11)];
        let outcome = solve(&tasks, &slots, 14);

        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(2));
    }

    #[test]
    fn test_empty_model_is_optimal_with_no_assignments() {
        let outcome = solve(&[], &[], 28);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(0));
        assert!(outcome.assignments.is_empty());
    }

    #[test]
    fn test_model_invalid_for_zero_demand_task() {
        let tasks = vec![Task::new(1, "a", 1, 0)];
        let slots = vec![CalendarSlot::new(1, 0, 9, 17)];
        let outcome = solve(&tasks, &slots, 7);
        assert_eq!(outcome.status, SolveStatus::ModelInvalid);
    }

    #[test]
    fn test_hour_counts_exact_on_success() {
        let tasks = vec![
            Task::new(1, "a", 1, 5),
            Task::new(2, "b", 1, 3),
            Task::new(3, "c", 2, 4),
        ];
        let slots = vec![
            CalendarSlot::new(1, 0, 9, 13),
            CalendarSlot::new(1, 1, 9, 13),
            CalendarSlot::new(2, 0, 9, 13),
            CalendarSlot::new(2, 1, 9, 13),
            CalendarSlot::new(3, 0, 9, 13),
        ];
        let outcome = solve(&tasks, &slots, 14);

        assert!(outcome.status.is_solution());
        for task in [(1i64, 5usize), (2, 3), (3, 4)] {
            let placed = outcome
                .assignments
                .iter()
                .filter(|a| a.task_id == task.0)
                .count();
            assert_eq!(placed, task.1, "task {} hour count", task.0);
        }
    }

    #[test]
    fn test_deterministic_with_single_worker() {
        let tasks: Vec<Task> = (0..10)
            .map(|i| Task::new(i, format!("t{i}"), i % 2, 4).with_priority((i * 9 % 70) as f64))
            .collect();
        let slots: Vec<CalendarSlot> = (0..10)
            .flat_map(|i| {
                vec![
                    CalendarSlot::new(i, 0, 9, 13),
                    CalendarSlot::new(i, 2, 9, 13),
                    CalendarSlot::new(i, 4, 9, 13),
                ]
            })
            .collect();

        let first = solve(&tasks, &slots, 28);
        let second = solve(&tasks, &slots, 28);
        assert_eq!(first.status, second.status);
        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.objective, second.objective);
    }

    #[test]
    fn test_stats_reflect_model_size() {
        let tasks = vec![Task::new(1, "a", 1, 2)];
        let slots = vec![CalendarSlot::new(1, 0, 9, 12)];
        let outcome = solve(&tasks, &slots, 7);

        // 3 slot Booleans + 1 day Boolean
        assert_eq!(outcome.stats.booleans, 4);
        assert!(outcome.stats.constraints >= 1);
        assert!(outcome.stats.wall_time >= 0.0);
    }

    #[test]
    fn test_respects_preoccupied_hours() {
        let tasks = vec![Task::new(1, "a", 1, 2)];
        let slots = vec![CalendarSlot::new(1, 0, 9, 12)];
        let index = CandidateIndex::build(&tasks, &slots, &[], monday(), 7);
        let mut occupancy = Occupancy::new();
        occupancy.take(1, monday(), 9);

        let params = SolverParams {
            workers: 1,
            ..Default::default()
        };
        let outcome = CpScheduler::new(params).solve(&tasks, &index, &occupancy);
        assert!(outcome.status.is_solution());
        let picked: Vec<u8> = outcome.assignments.iter().map(|a| a.hour).collect();
        assert_eq!(picked, vec![10, 11]);
    }
}
