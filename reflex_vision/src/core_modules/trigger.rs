// THEORY:
// The `trigger` module is the correctness-critical piece of the whole engine.
// The proximity evaluator produces a per-frame boolean; naively acting on it
// would hammer the trigger key on every frame of a close interval. The
// `TriggerGate` converts that level signal into an edge signal: the action is
// requested exactly once when the target enters the zone, and the gate only
// re-arms after the target has left it again.
//
// Key architectural principles:
// 1.  **Two-Phase Firing**: `decide` only *classifies* the pending
//     transition; it never commits the `Outside -> Inside` edge by itself.
//     The caller performs the side effect (the key send) and then calls
//     `confirm_fire`. If the send fails, the gate stays `Outside` and the
//     next close frame produces `Fire` again, so a failed send retries
//     within the same close interval instead of being silently swallowed.
// 2.  **Single Carried Bit**: the gate's entire state is one boolean. It is
//     owned by the loop worker and never shared, so no synchronization is
//     needed around it.
// 3.  **Skipped Frames Are Neutral**: when either marker is undetected the
//     caller simply does not call `decide`, leaving the gate exactly as it
//     was. A dropped frame can therefore never fire the action or falsely
//     re-arm the gate.

/// What the loop should do with the current frame's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// Outside -> Inside edge: send the trigger key, then `confirm_fire`.
    Fire,
    /// Still inside the zone; suppress repeats.
    Hold,
    /// Inside -> Outside edge: the gate has re-armed. No action.
    Release,
    /// Outside and staying outside (also reported for skipped frames).
    Idle,
}

/// Edge-triggering gate with hysteresis over the per-frame `is_close` signal.
#[derive(Debug, Default)]
pub struct TriggerGate {
    inside: bool,
}

impl TriggerGate {
    pub fn new() -> Self {
        Self { inside: false }
    }

    /// Classifies this frame's transition. Mutates state only on the
    /// `Inside -> Outside` edge; the firing edge is committed separately via
    /// [`confirm_fire`](Self::confirm_fire).
    pub fn decide(&mut self, is_close: bool) -> TriggerDecision {
        match (self.inside, is_close) {
            (false, true) => TriggerDecision::Fire,
            (true, true) => TriggerDecision::Hold,
            (true, false) => {
                self.inside = false;
                TriggerDecision::Release
            }
            (false, false) => TriggerDecision::Idle,
        }
    }

    /// Commits the `Outside -> Inside` transition after the action landed.
    pub fn confirm_fire(&mut self) {
        self.inside = true;
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives the gate over a close/not-close sequence, confirming every
    /// fire, and returns the number of fires.
    fn count_fires(gate: &mut TriggerGate, frames: &[bool]) -> usize {
        let mut fires = 0;
        for &is_close in frames {
            if gate.decide(is_close) == TriggerDecision::Fire {
                gate.confirm_fire();
                fires += 1;
            }
        }
        fires
    }

    #[test]
    fn fires_once_per_contiguous_close_interval() {
        let mut gate = TriggerGate::new();
        assert_eq!(count_fires(&mut gate, &[true, true, true, true]), 1);
    }

    #[test]
    fn fire_count_equals_entry_edge_count() {
        let mut gate = TriggerGate::new();
        let frames = [
            false, true, true, false, false, true, false, true, true, true,
        ];
        // Three Outside -> Inside edges, ten frames, six of them close.
        assert_eq!(count_fires(&mut gate, &frames), 3);
    }

    #[test]
    fn holds_while_inside() {
        let mut gate = TriggerGate::new();
        assert_eq!(gate.decide(true), TriggerDecision::Fire);
        gate.confirm_fire();
        assert_eq!(gate.decide(true), TriggerDecision::Hold);
        assert_eq!(gate.decide(true), TriggerDecision::Hold);
    }

    #[test]
    fn release_rearms_the_gate() {
        let mut gate = TriggerGate::new();
        gate.decide(true);
        gate.confirm_fire();
        assert_eq!(gate.decide(false), TriggerDecision::Release);
        assert_eq!(gate.decide(true), TriggerDecision::Fire);
    }

    #[test]
    fn unconfirmed_fire_is_requested_again() {
        // A failed key send leaves the gate outside, so the same close
        // interval keeps asking for the action until a send succeeds.
        let mut gate = TriggerGate::new();
        assert_eq!(gate.decide(true), TriggerDecision::Fire);
        assert_eq!(gate.decide(true), TriggerDecision::Fire);
        gate.confirm_fire();
        assert_eq!(gate.decide(true), TriggerDecision::Hold);
    }

    #[test]
    fn idle_outside_the_zone() {
        let mut gate = TriggerGate::new();
        assert_eq!(gate.decide(false), TriggerDecision::Idle);
        assert!(!gate.is_inside());
    }
}
