//! Solution document: the canonical output of one planning call.
//!
//! Merges assignments from whichever algorithm path ran, computes
//! completeness, and carries run statistics. Also renders the schedule as a
//! human-readable listing for the CLI.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Assignment, Task};
use crate::scheduler::cp::{SolveStatus, SolverStats};

/// Final status of a planning call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    /// Every task complete, day count proven minimal.
    Optimal,
    /// Every task complete.
    Feasible,
    /// At least one task has fewer scheduled hours than requested.
    Partial,
    /// No assignments could be produced.
    Infeasible,
    /// The horizon cap was reached with the solver still on the clock.
    Timeout,
}

impl PlanStatus {
    /// True when the document carries a usable schedule.
    pub fn is_solution(self) -> bool {
        matches!(
            self,
            PlanStatus::Optimal | PlanStatus::Feasible | PlanStatus::Partial
        )
    }
}

/// Which algorithm path produced the accepted schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Greedy,
    Ortools,
    HybridGreedyOrtools,
    OrtoolsFallback,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Greedy => "greedy",
            Algorithm::Ortools => "ortools",
            Algorithm::HybridGreedyOrtools => "hybrid_greedy_ortools",
            Algorithm::OrtoolsFallback => "ortools_fallback",
        };
        f.write_str(name)
    }
}

/// One scheduled hour in the output document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SlotRef {
    pub date: NaiveDate,
    pub hour: u8,
}

/// The solution document handed back to the caller.
#[derive(Debug, Serialize)]
pub struct PlanDocument {
    /// Per-task assignments, sorted (date asc, hour asc).
    pub tasks: BTreeMap<i64, Vec<SlotRef>>,
    /// Total task-days used when a CP pass produced the accepted schedule;
    /// `null` for greedy-only runs (and covers only the CP share in hybrid
    /// runs).
    pub objective_value: Option<i64>,
    pub status: PlanStatus,
    /// Wall-clock planning time, seconds.
    pub solve_time: f64,
    /// Final horizon the schedule was built against.
    pub horizon_days: u32,
    pub algorithm_used: Algorithm,
    /// Scheduled hours over requested hours, aggregate.
    pub completeness: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unscheduled_tasks: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_stats: Option<SolverStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Everything the assembler needs to know about how the run went.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub algorithm: Option<Algorithm>,
    /// Status of the CP pass that produced the accepted schedule, if any.
    pub solver_status: Option<SolveStatus>,
    /// The horizon cap was passed without a solution.
    pub capped: bool,
    /// The last solver attempt died on its deadline.
    pub timed_out: bool,
    pub objective: Option<i64>,
    pub solve_time: f64,
    pub horizon_days: u32,
    pub solver_stats: Option<SolverStats>,
    pub diagnostic: Option<String>,
}

/// Merge assignments into the canonical document.
///
/// `tasks` are the tasks the engine attempted (zero-hour tasks already
/// dropped). Status ranking: a capped run reports `TIMEOUT`/`INFEASIBLE`
/// with no assignments; otherwise completeness decides between the solver
/// status and `PARTIAL`, and an empty schedule for a non-empty task set is
/// `INFEASIBLE`.
pub fn assemble(tasks: &[Task], assignments: Vec<Assignment>, summary: RunSummary) -> PlanDocument {
    let algorithm = summary.algorithm.unwrap_or(Algorithm::Ortools);

    if summary.capped {
        let status = if summary.timed_out {
            PlanStatus::Timeout
        } else {
            PlanStatus::Infeasible
        };
        return PlanDocument {
            tasks: BTreeMap::new(),
            objective_value: None,
            status,
            solve_time: summary.solve_time,
            horizon_days: summary.horizon_days,
            algorithm_used: algorithm,
            completeness: 0.0,
            unscheduled_tasks: tasks.iter().map(|t| t.id).collect(),
            solver_stats: summary.solver_stats,
            diagnostic: summary.diagnostic.or_else(|| {
                Some("no feasible schedule within horizon cap".to_string())
            }),
        };
    }

    let mut by_task: BTreeMap<i64, Vec<SlotRef>> = BTreeMap::new();
    for a in &assignments {
        by_task.entry(a.task_id).or_default().push(SlotRef {
            date: a.date,
            hour: a.hour,
        });
    }
    for slots in by_task.values_mut() {
        slots.sort();
    }

    let requested: u64 = tasks.iter().map(|t| t.remaining_hours as u64).sum();
    let scheduled: u64 = assignments.len() as u64;
    let completeness = if requested == 0 {
        1.0
    } else {
        scheduled as f64 / requested as f64
    };

    let unscheduled_tasks: Vec<i64> = tasks
        .iter()
        .filter(|t| {
            let placed = by_task.get(&t.id).map(Vec::len).unwrap_or(0);
            placed < t.remaining_hours as usize
        })
        .map(|t| t.id)
        .collect();

    let status = if tasks.is_empty() {
        PlanStatus::Optimal
    } else if assignments.is_empty() {
        PlanStatus::Infeasible
    } else if !unscheduled_tasks.is_empty() {
        PlanStatus::Partial
    } else {
        match summary.solver_status {
            Some(SolveStatus::Optimal) => PlanStatus::Optimal,
            _ => PlanStatus::Feasible,
        }
    };

    PlanDocument {
        tasks: by_task,
        objective_value: summary.objective,
        status,
        solve_time: summary.solve_time,
        horizon_days: summary.horizon_days,
        algorithm_used: algorithm,
        completeness,
        unscheduled_tasks,
        solver_stats: summary.solver_stats,
        diagnostic: summary.diagnostic,
    }
}

/// Render the schedule as a date-grouped listing plus a per-task summary.
pub fn render_text(document: &PlanDocument, tasks: &[Task]) -> String {
    let mut out = String::new();
    out.push_str("SCHEDULE\n");
    out.push_str(&"=".repeat(72));
    out.push('\n');

    if document.tasks.is_empty() {
        out.push_str("No assignments.\n");
        return out;
    }

    let name_of = |id: i64| -> &str {
        tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
            .unwrap_or("?")
    };

    // Flatten and regroup by date
    let mut rows: Vec<(NaiveDate, u8, i64)> = Vec::new();
    for (&task_id, slots) in &document.tasks {
        for slot in slots {
            rows.push((slot.date, slot.hour, task_id));
        }
    }
    rows.sort();

    let mut current: Option<NaiveDate> = None;
    for (date, hour, task_id) in rows {
        if current != Some(date) {
            out.push_str(&format!("\n{} ({})\n", date.format("%d/%m/%Y"), date.format("%A")));
            out.push_str(&"-".repeat(72));
            out.push('\n');
            current = Some(date);
        }
        out.push_str(&format!(
            "{:02}:00 - {:02}:00  |  {} (ID: {})\n",
            hour,
            hour + 1,
            name_of(task_id),
            task_id
        ));
    }

    out.push_str("\nSUMMARY\n");
    for (&task_id, slots) in &document.tasks {
        let mut days: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
        days.dedup();
        out.push_str(&format!(
            "{} (ID: {}): {} hour(s) over {} day(s)\n",
            name_of(task_id),
            task_id,
            slots.len(),
            days.len()
        ));
    }
    if !document.unscheduled_tasks.is_empty() {
        let ids: Vec<String> = document
            .unscheduled_tasks
            .iter()
            .map(i64::to_string)
            .collect();
        out.push_str(&format!("Not fully scheduled: {}\n", ids.join(", ")));
    }
    out
}
