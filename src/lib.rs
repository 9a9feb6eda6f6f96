//! Hybrid hour-slot task planner.
//!
//! Plans batches of tasks onto the working hours of their assigned
//! resources: weekly calendars and leaves are pre-computed into per-task
//! candidate slots, a greedy pass or a Boolean CP solver (or both, in
//! sequence) places every hour unit, and an outer controller grows the
//! planning horizon until a feasible schedule exists or a hard cap is hit.

pub mod config;
pub mod demo;
pub mod domain;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod solution;

pub use config::Config;
pub use models::{Assignment, CalendarSlot, InputError, Leave, PlanParams, PlanRequest, Task};
pub use scheduler::plan;
pub use solution::{render_text, Algorithm, PlanDocument, PlanStatus};
