//! Scheduling algorithms.
//!
//! Greedy construction, the Boolean-model CP scheduler, the horizon
//! controller around it, and the hybrid orchestrator that routes between
//! them.

pub mod cp;
pub mod greedy;
pub mod horizon;
pub mod hybrid;

pub use cp::{CpOutcome, CpScheduler, SolveStatus, SolverParams, SolverStats};
pub use greedy::{GreedyOutcome, GreedyScheduler};
pub use horizon::{HorizonController, HorizonOutcome};
pub use hybrid::plan;
