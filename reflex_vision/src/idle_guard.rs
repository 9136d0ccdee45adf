//! Anti-idle worker: prevents the session from timing out while the player
//! is away, independently of the reflex loop.
//!
//! Every 8 to 14 seconds (uniform jitter, so the cadence does not look
//! scripted) it taps one random movement key with a short hold. It rides on
//! the same `Supervisor` machinery as the reflex loop and shares nothing
//! with it beyond the input layer.

use crate::bot::Supervisor;
use crate::input::{InputDriver, Key};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, warn};

const MOVEMENT_KEYS: [Key; 4] = [
    Key::Unicode('w'),
    Key::Unicode('a'),
    Key::Unicode('s'),
    Key::Unicode('d'),
];

const MIN_DELAY_SECS: f64 = 8.0;
const MAX_DELAY_SECS: f64 = 14.0;
const TAP_HOLD: Duration = Duration::from_millis(10);

/// Flag polls while sleeping between taps, so `stop` stays responsive.
const SLEEP_SLICE: Duration = Duration::from_millis(200);

fn jittered_delay(rng: &mut impl Rng) -> Duration {
    Duration::from_secs_f64(rng.random_range(MIN_DELAY_SECS..=MAX_DELAY_SECS))
}

/// Owned start/stop handle for the anti-idle worker.
#[derive(Default)]
pub struct IdleGuard {
    supervisor: Supervisor,
}

impl IdleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) -> bool {
        self.supervisor.start("idle-guard", idle_loop)
    }

    pub fn stop(&mut self) -> bool {
        self.supervisor.stop()
    }

    pub fn is_running(&self) -> bool {
        self.supervisor.is_running()
    }
}

fn idle_loop(running: Arc<AtomicBool>) {
    let mut input = match InputDriver::new() {
        Ok(input) => input,
        Err(error) => {
            error!(%error, "cannot open input backend; idle guard aborted");
            return;
        }
    };
    let mut rng = rand::rng();

    while running.load(Ordering::SeqCst) {
        let key = *MOVEMENT_KEYS
            .choose(&mut rng)
            .expect("movement key set is non-empty");
        if let Err(error) = input.hold(key, TAP_HOLD) {
            warn!(%error, "idle tap failed");
        } else {
            debug!(?key, "idle tap sent");
        }

        let mut remaining = jittered_delay(&mut rng);
        while !remaining.is_zero() && running.load(Ordering::SeqCst) {
            let slice = remaining.min(SLEEP_SLICE);
            thread::sleep(slice);
            remaining -= slice;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_the_configured_window() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let delay = jittered_delay(&mut rng);
            assert!(delay >= Duration::from_secs_f64(MIN_DELAY_SECS));
            assert!(delay <= Duration::from_secs_f64(MAX_DELAY_SECS));
        }
    }
}
