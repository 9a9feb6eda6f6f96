//! Deterministic sample-data generation for the CLI demo.

use chrono::NaiveDate;

use crate::domain::add_days;
use crate::models::{CalendarSlot, Leave, PlanParams, PlanRequest, Task};

const ACTIVITY_NAMES: &[&str] = &[
    "Design review",
    "Implementation",
    "Testing",
    "Documentation",
    "Analysis",
    "Customer support",
    "Data migration",
    "Refactoring",
];

/// Generate a reproducible request: `tasks` tasks spread over `users`
/// resources, weekday working calendars, and a sprinkling of leaves.
pub fn generate(tasks: usize, users: usize, seed: u64, start_date: NaiveDate) -> PlanRequest {
    let users = users.max(1);
    let mut rng = Rng::new(seed);

    let mut task_rows = Vec::with_capacity(tasks);
    let mut calendar_slots = Vec::new();
    let mut leaves = Vec::new();

    for i in 0..tasks {
        let id = i as i64 + 1;
        let user_id = (i % users) as i64 + 1;
        let hours = 2 + (rng.next() % 10) as u32;
        let priority = 20.0 + (rng.next() % 76) as f64;
        let name = format!(
            "{} {}",
            ACTIVITY_NAMES[rng.next() as usize % ACTIVITY_NAMES.len()],
            id
        );
        task_rows.push(Task::new(id, name, user_id, hours).with_priority(priority));

        // Monday-Friday, morning and afternoon windows
        for dayofweek in 0..5 {
            calendar_slots.push(CalendarSlot::new(id, dayofweek, 9, 13));
            calendar_slots.push(CalendarSlot::new(id, dayofweek, 14, 18));
        }

        // Roughly one task in five gets a short leave in the first two weeks
        if rng.next() % 5 == 0 {
            let offset = (rng.next() % 10) as u32;
            let length = 1 + (rng.next() % 3) as u32;
            let from = add_days(start_date, offset);
            leaves.push(Leave::new(id, from, add_days(from, length - 1)));
        }
    }

    PlanRequest {
        tasks: task_rows,
        calendar_slots,
        leaves,
        params: PlanParams {
            start_date: Some(start_date),
            ..Default::default()
        },
    }
}

/// xorshift64* — deterministic, seed-stable across runs.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(2685_8216_5773_6338_717).max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate(20, 4, 7, monday());
        let second = generate(20, 4, 7, monday());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_generated_request_is_valid() {
        let request = generate(50, 8, 3, monday());
        assert!(request.validate().is_ok());
        assert_eq!(request.tasks.len(), 50);
        // Every task has a weekday calendar
        assert_eq!(request.calendar_slots.len(), 50 * 10);
    }

    #[test]
    fn test_seed_changes_output() {
        let a = generate(10, 2, 1, monday());
        let b = generate(10, 2, 2, monday());
        assert_ne!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
