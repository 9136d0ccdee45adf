// THEORY:
// The `maintenance` module owns the two wall-clock timers that ride along
// with the frame loop: a keep-alive keystroke that must go out every few
// seconds regardless of what the detector sees, and a much slower resource
// check that replenishes a consumable. Neither may stall the frame loop, so
// this module does no I/O at all: it only answers "what is due now?" and
// records "this just happened". The loop performs the actual key sends.
//
// Taking `now` as a parameter instead of calling `Instant::now()` internally
// keeps the schedule testable against a simulated clock.

use std::time::{Duration, Instant};

/// Cadence of the keep-alive keystroke.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Cadence of the consumable-resource template search.
pub const RESOURCE_CHECK_INTERVAL: Duration = Duration::from_secs(120);

/// Which maintenance actions are due this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceDue {
    pub keep_alive: bool,
    pub resource_check: bool,
}

/// Two independent fixed-interval timers, mutated only by the loop worker.
#[derive(Debug)]
pub struct MaintenanceSchedule {
    keep_alive_every: Duration,
    resource_check_every: Duration,
    last_keep_alive: Instant,
    last_resource_check: Instant,
}

impl MaintenanceSchedule {
    pub fn new(keep_alive_every: Duration, resource_check_every: Duration, now: Instant) -> Self {
        Self {
            keep_alive_every,
            resource_check_every,
            last_keep_alive: now,
            last_resource_check: now,
        }
    }

    pub fn with_defaults(now: Instant) -> Self {
        Self::new(KEEP_ALIVE_INTERVAL, RESOURCE_CHECK_INTERVAL, now)
    }

    pub fn due(&self, now: Instant) -> MaintenanceDue {
        MaintenanceDue {
            keep_alive: now.duration_since(self.last_keep_alive) >= self.keep_alive_every,
            resource_check: now.duration_since(self.last_resource_check)
                >= self.resource_check_every,
        }
    }

    /// Records a keep-alive send. Consuming a resource ends with the same
    /// keystroke, so the resource path records one of these too.
    pub fn note_keep_alive(&mut self, now: Instant) {
        self.last_keep_alive = now;
    }

    pub fn note_resource_check(&mut self, now: Instant) {
        self.last_resource_check = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_due_right_after_construction() {
        let base = Instant::now();
        let schedule = MaintenanceSchedule::with_defaults(base);
        let due = schedule.due(base + Duration::from_secs(1));
        assert!(!due.keep_alive);
        assert!(!due.resource_check);
    }

    #[test]
    fn keep_alive_due_after_its_interval() {
        let base = Instant::now();
        let schedule = MaintenanceSchedule::with_defaults(base);
        let due = schedule.due(base + Duration::from_secs(16));
        assert!(due.keep_alive);
        assert!(!due.resource_check);
    }

    #[test]
    fn resource_check_due_after_its_interval() {
        let base = Instant::now();
        let schedule = MaintenanceSchedule::with_defaults(base);
        let due = schedule.due(base + Duration::from_secs(121));
        assert!(due.keep_alive);
        assert!(due.resource_check);
    }

    #[test]
    fn noting_resets_each_timer_independently() {
        let base = Instant::now();
        let mut schedule = MaintenanceSchedule::with_defaults(base);

        let later = base + Duration::from_secs(130);
        schedule.note_keep_alive(later);
        let due = schedule.due(later);
        assert!(!due.keep_alive);
        assert!(due.resource_check);

        schedule.note_resource_check(later);
        let due = schedule.due(later + Duration::from_secs(1));
        assert!(!due.resource_check);
    }

    #[test]
    fn keep_alive_fires_at_cadence_under_a_simulated_loop() {
        // Drive a simulated loop for five minutes at one-second ticks with no
        // detections at all; the keep-alive must land at least once per
        // 15-second window.
        let base = Instant::now();
        let mut schedule = MaintenanceSchedule::with_defaults(base);
        let mut sends: Vec<u64> = Vec::new();

        for tick in 1..=300u64 {
            let now = base + Duration::from_secs(tick);
            if schedule.due(now).keep_alive {
                schedule.note_keep_alive(now);
                sends.push(tick);
            }
        }

        assert!(!sends.is_empty());
        let mut previous = 0;
        for &tick in &sends {
            assert!(tick - previous <= 15, "gap from {previous} to {tick}");
            previous = tick;
        }
    }
}
