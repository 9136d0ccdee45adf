// THEORY:
// The `bot` module owns the control loop. Everything else in the crate is a
// pure-ish building block; this is where they get wired into the one loop
// that captures, decides, and acts, and where the start/stop surface exposed
// to the front end lives.
//
// Key architectural principles:
// 1.  **Owned Instance, No Singleton**: a `ReflexBot` is a plain owned value.
//     Whoever holds it is the only one who can start or stop it, so "at most
//     one live loop" is guaranteed by ownership rather than module state.
// 2.  **Cooperative Cancellation**: the worker polls an `Arc<AtomicBool>`
//     once per iteration. `stop` clears the flag and joins with a bounded
//     timeout, then proceeds regardless; a single iteration always runs to
//     completion.
// 3.  **Errors Are Branches, Not Exceptions**: every fallible call in the
//     loop returns a `Result`, and the decision to log-and-continue is a
//     visible branch. A failed capture retries next iteration; a failed
//     trigger send leaves the gate un-fired so it retries while the zone
//     holds; only an explicit stop or the overlay's Escape ends the loop.
// 4.  **Maintenance First**: the wall-clock timers are serviced at the top of
//     each iteration, before the vision work, so slow detection can never
//     starve the keep-alive. Detection still runs every iteration no matter
//     what maintenance did.

use crate::capture::RegionCapturer;
use crate::core_modules::maintenance::MaintenanceSchedule;
use crate::core_modules::trigger::TriggerDecision;
use crate::input::{InputDriver, KEEP_ALIVE_KEY, RESOURCE_KEY, TRIGGER_KEY};
use crate::overlay::{OverlayWindow, annotate};
use crate::pipeline::{ReflexConfig, ReflexPipeline};
use crate::templates::{RESOURCE_CONFIDENCE, RESOURCE_TEMPLATES, TemplateRegistry};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Idle time between iterations; bounds CPU use, not correctness.
pub const LOOP_SLEEP: Duration = Duration::from_millis(30);

/// Settle delay between the firing decision and the key send, absorbing
/// capture and processing jitter.
pub const FIRE_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// How long `stop` waits for the worker before proceeding anyway.
pub const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between consuming the resource and re-opening the interaction.
const RESOURCE_USE_DELAY: Duration = Duration::from_secs(1);

/// Where the resource-check reference icons live, relative to the working
/// directory.
const RESOURCE_TEMPLATE_DIR: &str = "assets/templates";

/// Start/stop handle around one worker thread and its run flag.
///
/// Generic over the worker body so the cancellation machinery is testable
/// without a screen or an input device; `ReflexBot` and `IdleGuard` both sit
/// on top of it.
#[derive(Default)]
pub struct Supervisor {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the worker. Returns `false` without side effects when a worker
    /// is already active.
    pub fn start<F>(&mut self, name: &str, worker: F) -> bool
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            return false;
        }
        // Reap a worker that exited on its own (e.g. overlay interrupt).
        if let Some(stale) = self.handle.take() {
            let _ = stale.join();
        }

        self.running.store(true, Ordering::SeqCst);
        let flag = Arc::clone(&self.running);
        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            worker(Arc::clone(&flag));
            flag.store(false, Ordering::SeqCst);
        });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                true
            }
            Err(error) => {
                self.running.store(false, Ordering::SeqCst);
                error!(%error, "failed to spawn worker thread");
                false
            }
        }
    }

    /// Requests a stop and waits up to [`STOP_JOIN_TIMEOUT`] for the worker
    /// to observe it. Returns `false` when no worker was running.
    pub fn stop(&mut self) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            if let Some(stale) = self.handle.take() {
                let _ = stale.join();
            }
            return false;
        }

        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let deadline = Instant::now() + STOP_JOIN_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                // Best-effort join only: detach and move on.
                warn!("worker ignored stop for {STOP_JOIN_TIMEOUT:?}; detaching");
            }
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// The complete surface exposed to the front end: start, stop, is-running.
pub struct ReflexBot {
    supervisor: Supervisor,
    config: ReflexConfig,
}

impl Default for ReflexBot {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflexBot {
    pub fn new() -> Self {
        Self::with_config(ReflexConfig::default())
    }

    pub fn with_config(config: ReflexConfig) -> Self {
        Self {
            supervisor: Supervisor::new(),
            config,
        }
    }

    /// Starts the loop worker; `debug` opens the live overlay window.
    /// Returns `false` when the loop is already running.
    pub fn start(&mut self, debug: bool) -> bool {
        let config = self.config.clone();
        self.supervisor
            .start("reflex-loop", move |running| run_loop(config, debug, running))
    }

    /// Stops the loop worker; returns `false` when it was not running.
    pub fn stop(&mut self) -> bool {
        self.supervisor.stop()
    }

    pub fn is_running(&self) -> bool {
        self.supervisor.is_running()
    }
}

// The parameter is named `debug_enabled` rather than `debug` because
// `tracing`'s event macros internally import `field::debug`, which collides
// with a local of that name inside field expressions.
fn run_loop(config: ReflexConfig, debug_enabled: bool, running: Arc<AtomicBool>) {
    let capturer = match RegionCapturer::new() {
        Ok(capturer) => capturer,
        Err(error) => {
            error!(%error, "cannot open screen capture; loop aborted");
            return;
        }
    };
    let mut input = match InputDriver::new() {
        Ok(input) => input,
        Err(error) => {
            error!(%error, "cannot open input backend; loop aborted");
            return;
        }
    };
    let templates = match TemplateRegistry::load_dir(RESOURCE_TEMPLATE_DIR) {
        Ok(templates) => templates,
        Err(error) => {
            warn!(%error, "resource templates unavailable; resource check disabled");
            TemplateRegistry::empty()
        }
    };

    let region = capturer.region();
    info!(?region, debug = debug_enabled, "reflex loop started");

    let mut pipeline = ReflexPipeline::new(config.clone());
    let mut schedule = MaintenanceSchedule::with_defaults(Instant::now());
    let mut overlay = if debug_enabled {
        match OverlayWindow::open(region.width(), region.height()) {
            Ok(window) => Some(window),
            Err(error) => {
                warn!(%error, "overlay window unavailable; continuing without it");
                None
            }
        }
    } else {
        None
    };

    // One interaction keystroke opens the mini-game.
    send_keep_alive(&mut input, &mut schedule);

    while running.load(Ordering::SeqCst) {
        run_maintenance(&mut input, &mut schedule, &templates, &capturer);

        let mut frame = match capturer.capture() {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, "capture failed; retrying next iteration");
                thread::sleep(LOOP_SLEEP);
                continue;
            }
        };

        let report = pipeline.assess(&frame);
        if report.decision == TriggerDecision::Fire {
            thread::sleep(FIRE_SETTLE_DELAY);
            match input.tap(TRIGGER_KEY) {
                Ok(()) => {
                    pipeline.confirm_fire();
                    if let Some(proximity) = report.proximity {
                        info!(gap = proximity.gap, "trigger fired");
                    }
                }
                Err(error) => {
                    warn!(%error, "trigger send failed; retrying while the zone holds");
                }
            }
        }

        if let Some(window) = overlay.as_mut() {
            annotate(&mut frame, &report, config.radius_offset);
            match window.present(&frame, report.proximity.map(|p| p.gap)) {
                Ok(()) => {
                    if window.interrupt_requested() {
                        info!("overlay interrupt; stopping loop");
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "overlay failed; disabling debug window");
                    overlay = None;
                }
            }
        }

        thread::sleep(LOOP_SLEEP);
    }

    info!("reflex loop stopped");
}

/// Services both wall-clock timers. Runs before the vision work each
/// iteration so detection cost can never starve maintenance.
fn run_maintenance(
    input: &mut InputDriver,
    schedule: &mut MaintenanceSchedule,
    templates: &TemplateRegistry,
    capturer: &RegionCapturer,
) {
    let now = Instant::now();
    if schedule.due(now).resource_check {
        schedule.note_resource_check(now);
        run_resource_check(input, schedule, templates, capturer);
    }

    // Re-check: consuming a resource ends in a keep-alive keystroke, which
    // makes an immediate second send redundant.
    if schedule.due(Instant::now()).keep_alive {
        send_keep_alive(input, schedule);
    }
}

fn run_resource_check(
    input: &mut InputDriver,
    schedule: &mut MaintenanceSchedule,
    templates: &TemplateRegistry,
    capturer: &RegionCapturer,
) {
    if templates.is_empty() {
        return;
    }
    let screen = match capturer.capture_full() {
        Ok(screen) => screen,
        Err(error) => {
            warn!(%error, "resource check capture failed");
            return;
        }
    };
    match templates.locate_any(&screen, RESOURCE_TEMPLATES, RESOURCE_CONFIDENCE) {
        Some(region) => {
            info!(?region, "resource icon found; consuming");
            if let Err(error) = input.tap(RESOURCE_KEY) {
                warn!(%error, "resource key send failed");
                return;
            }
            thread::sleep(RESOURCE_USE_DELAY);
            send_keep_alive(input, schedule);
        }
        None => debug!("no resource icon on screen"),
    }
}

fn send_keep_alive(input: &mut InputDriver, schedule: &mut MaintenanceSchedule) {
    match input.tap(KEEP_ALIVE_KEY) {
        Ok(()) => {
            schedule.note_keep_alive(Instant::now());
            debug!("keep-alive sent");
        }
        Err(error) => warn!(%error, "keep-alive send failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn spin_worker(running: Arc<AtomicBool>) {
        while running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn wait_until_stopped(supervisor: &Supervisor) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while supervisor.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn start_twice_leaves_exactly_one_worker() {
        let entries = Arc::new(AtomicUsize::new(0));
        let mut supervisor = Supervisor::new();

        let first_entries = Arc::clone(&entries);
        assert!(supervisor.start("test-worker", move |running| {
            first_entries.fetch_add(1, Ordering::SeqCst);
            spin_worker(running);
        }));

        let second_entries = Arc::clone(&entries);
        assert!(!supervisor.start("test-worker", move |running| {
            second_entries.fetch_add(1, Ordering::SeqCst);
            spin_worker(running);
        }));

        assert!(supervisor.is_running());
        assert!(supervisor.stop());
        wait_until_stopped(&supervisor);
        assert_eq!(entries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_while_not_running_returns_false() {
        let mut supervisor = Supervisor::new();
        assert!(!supervisor.stop());
    }

    #[test]
    fn stop_after_stop_returns_false() {
        let mut supervisor = Supervisor::new();
        assert!(supervisor.start("test-worker", spin_worker));
        assert!(supervisor.stop());
        assert!(!supervisor.stop());
    }

    #[test]
    fn worker_observes_the_cleared_flag() {
        let mut supervisor = Supervisor::new();
        let iterations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&iterations);

        supervisor.start("test-worker", move |running| {
            while running.load(Ordering::SeqCst) {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(1));
            }
        });

        thread::sleep(Duration::from_millis(20));
        assert!(supervisor.stop());
        let count_at_stop = iterations.load(Ordering::SeqCst);
        assert!(count_at_stop > 0);

        // No further iterations after a completed stop.
        thread::sleep(Duration::from_millis(20));
        assert_eq!(iterations.load(Ordering::SeqCst), count_at_stop);
    }

    #[test]
    fn self_exiting_worker_can_be_restarted() {
        let mut supervisor = Supervisor::new();
        assert!(supervisor.start("test-worker", |_running| {}));
        wait_until_stopped(&supervisor);
        assert!(!supervisor.is_running());
        assert!(supervisor.start("test-worker", spin_worker));
        assert!(supervisor.stop());
    }
}
