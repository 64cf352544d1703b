//! Touch gesture gate: rate-limits touch-starts and detects the double-tap
//! reset gesture. Timestamps are injected so the logic tests natively.

/// Touch-starts closer together than this are dropped.
const MIN_START_INTERVAL_MS: f64 = 16.0;
/// A second accepted touch-start within this window is a reset gesture.
const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapAction {
    /// Event fired too soon after the previous one; drop it.
    Ignored,
    /// Normal touch: start tracking pointer movement.
    Track,
    /// Double tap: reset the snake and trail.
    Reset,
}

/// Per-engine touch state.
#[derive(Clone, Debug, Default)]
pub struct TouchGate {
    last_start_ms: Option<f64>,
    /// A one-finger touch is currently down and being tracked.
    pub active: bool,
}

impl TouchGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(&mut self, now_ms: f64) -> TapAction {
        if let Some(last) = self.last_start_ms {
            let elapsed = now_ms - last;
            if elapsed < MIN_START_INTERVAL_MS {
                return TapAction::Ignored;
            }
            if elapsed < DOUBLE_TAP_WINDOW_MS {
                // Consume the pair so a triple tap does not reset twice.
                self.last_start_ms = None;
                self.active = false;
                return TapAction::Reset;
            }
        }
        self.last_start_ms = Some(now_ms);
        self.active = true;
        TapAction::Track
    }

    pub fn on_end(&mut self) {
        self.active = false;
    }

    pub fn on_cancel(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_starts_are_rate_limited() {
        let mut gate = TouchGate::new();
        assert_eq!(gate.on_start(0.0), TapAction::Track);
        assert_eq!(gate.on_start(10.0), TapAction::Ignored);
        assert_eq!(gate.on_start(15.9), TapAction::Ignored);
    }

    #[test]
    fn second_start_within_window_resets() {
        let mut gate = TouchGate::new();
        assert_eq!(gate.on_start(0.0), TapAction::Track);
        assert_eq!(gate.on_start(120.0), TapAction::Reset);
        assert!(!gate.active);
        // The pair is consumed: the next tap tracks again.
        assert_eq!(gate.on_start(200.0), TapAction::Track);
    }

    #[test]
    fn slow_taps_do_not_reset() {
        let mut gate = TouchGate::new();
        assert_eq!(gate.on_start(0.0), TapAction::Track);
        gate.on_end();
        assert_eq!(gate.on_start(500.0), TapAction::Track);
        assert!(gate.active);
    }

    #[test]
    fn end_and_cancel_stop_tracking() {
        let mut gate = TouchGate::new();
        gate.on_start(0.0);
        assert!(gate.active);
        gate.on_end();
        assert!(!gate.active);
        gate.on_start(1000.0);
        gate.on_cancel();
        assert!(!gate.active);
    }
}
