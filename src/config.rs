//! Configuration for the planning engine.
//!
//! One immutable `Config` value, built from the environment (or defaults)
//! and threaded explicitly through the engine. No hidden globals.

use std::env;
use std::str::FromStr;

/// Engine configuration: solver limits, hybrid routing thresholds, and the
/// horizon-extension policy.
#[derive(Clone, Debug)]
pub struct Config {
    /// Planning window on the first solve attempt, in days.
    pub initial_horizon_days: u32,
    /// Multiplier applied to the horizon on each extension.
    pub horizon_extension_factor: f64,
    /// Hard cap on the horizon; past this the run reports no solution.
    pub max_horizon_days: u32,
    /// Wall-clock limit for one CP solve, in seconds.
    pub time_limit_seconds: f64,
    /// Shorter wall-clock limit for the residual CP pass after greedy.
    pub fallback_time_limit_seconds: f64,
    /// CP solver worker threads.
    pub workers: u32,
    /// Emit solver search progress.
    pub log_progress: bool,
    /// Enable greedy routing and the greedy+CP hybrid flow.
    pub hybrid_mode: bool,
    /// Route to greedy when the task count exceeds this.
    pub greedy_threshold_tasks: usize,
    /// Route to greedy when total remaining hours exceed this.
    pub greedy_threshold_hours: u64,
    /// Route to greedy when the distinct resource count exceeds this.
    pub greedy_threshold_users: usize,
    /// Route to greedy when mean hours per task exceed this.
    pub greedy_threshold_avg_hours: f64,
    /// Run the residual CP pass only when greedy left at most this many tasks.
    pub greedy_residual_limit: usize,
    /// Default path for the CLI to write the solution document to.
    pub output_file: Option<String>,
    /// Logging verbosity (see `logging`).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_horizon_days: 28,
            horizon_extension_factor: 1.25,
            max_horizon_days: 1825,
            time_limit_seconds: 30.0,
            fallback_time_limit_seconds: 60.0,
            workers: 4,
            log_progress: false,
            hybrid_mode: true,
            greedy_threshold_tasks: 50,
            greedy_threshold_hours: 1000,
            greedy_threshold_users: 10,
            greedy_threshold_avg_hours: 100.0,
            greedy_residual_limit: 20,
            output_file: None,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Build a config from the environment, falling back to defaults for
    /// unset or unparseable variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            initial_horizon_days: defaults.initial_horizon_days,
            horizon_extension_factor: defaults.horizon_extension_factor,
            max_horizon_days: var_or("MAX_HORIZON_DAYS", defaults.max_horizon_days),
            // ORTOOLS_TIMEOUT_SECONDS is the legacy alias for ORTOOLS_TIME_LIMIT
            time_limit_seconds: var_or(
                "ORTOOLS_TIME_LIMIT",
                var_or("ORTOOLS_TIMEOUT_SECONDS", defaults.time_limit_seconds),
            ),
            fallback_time_limit_seconds: var_or(
                "ORTOOLS_FALLBACK_TIMEOUT",
                defaults.fallback_time_limit_seconds,
            ),
            workers: var_or("ORTOOLS_WORKERS", defaults.workers),
            log_progress: flag_or("ORTOOLS_LOG_PROGRESS", defaults.log_progress),
            hybrid_mode: flag_or("HYBRID_MODE", defaults.hybrid_mode),
            greedy_threshold_tasks: var_or("GREEDY_THRESHOLD_TASKS", defaults.greedy_threshold_tasks),
            greedy_threshold_hours: var_or("GREEDY_THRESHOLD_HOURS", defaults.greedy_threshold_hours),
            greedy_threshold_users: var_or("GREEDY_THRESHOLD_USERS", defaults.greedy_threshold_users),
            greedy_threshold_avg_hours: var_or(
                "GREEDY_THRESHOLD_AVG_HOURS",
                defaults.greedy_threshold_avg_hours,
            ),
            greedy_residual_limit: defaults.greedy_residual_limit,
            output_file: env::var("SCHEDULE_OUTPUT_FILE").ok(),
            verbosity: var_or("SCHEDULER_VERBOSITY", defaults.verbosity),
        }
    }
}

/// Parse an environment variable, returning `default` when unset or invalid.
fn var_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => parse_or(&raw, default),
        Err(_) => default,
    }
}

/// Parse a boolean environment variable ("true"/"false", case-insensitive).
fn flag_or(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => raw.eq_ignore_ascii_case("true") || raw == "1",
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.initial_horizon_days, 28);
        assert_eq!(config.max_horizon_days, 1825);
        assert_eq!(config.time_limit_seconds, 30.0);
        assert_eq!(config.workers, 4);
        assert!(config.hybrid_mode);
        assert_eq!(config.greedy_threshold_tasks, 50);
        assert_eq!(config.greedy_threshold_hours, 1000);
        assert_eq!(config.greedy_threshold_users, 10);
        assert_eq!(config.greedy_threshold_avg_hours, 100.0);
        assert_eq!(config.greedy_residual_limit, 20);
    }

    #[test]
    fn test_parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or::<u32>("42", 7), 42);
        assert_eq!(parse_or::<u32>("not a number", 7), 7);
        assert_eq!(parse_or::<f64>(" 1.5 ", 0.0), 1.5);
    }
}
