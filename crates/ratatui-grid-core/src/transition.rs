//! Enter/exit visibility as a small state machine with durations as data.
//!
//! `Hidden -> Entering -> Visible -> Exiting -> Hidden`. The machine is advanced by elapsed time
//! from the caller's frame loop and is independent of any animation runtime; renderers read
//! [`Transition::progress`] to decide how much of the element to draw.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Entering,
    Visible,
    Exiting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionTimings {
    pub enter: Duration,
    pub exit: Duration,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            enter: Duration::from_millis(120),
            exit: Duration::from_millis(80),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    phase: Phase,
    elapsed: Duration,
    timings: TransitionTimings,
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(TransitionTimings::default())
    }
}

impl Transition {
    pub fn new(timings: TransitionTimings) -> Self {
        Self {
            phase: Phase::Hidden,
            elapsed: Duration::ZERO,
            timings,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Logically shown: entering or fully visible.
    pub fn is_shown(&self) -> bool {
        matches!(self.phase, Phase::Entering | Phase::Visible)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Hidden | Phase::Visible)
    }

    pub fn show(&mut self) {
        match self.phase {
            Phase::Hidden | Phase::Exiting => self.enter(Phase::Entering),
            Phase::Entering | Phase::Visible => {}
        }
    }

    pub fn hide(&mut self) {
        match self.phase {
            Phase::Visible | Phase::Entering => self.enter(Phase::Exiting),
            Phase::Hidden | Phase::Exiting => {}
        }
    }

    /// Jumps straight to the settled state matching the current direction.
    pub fn finish(&mut self) {
        match self.phase {
            Phase::Entering => self.enter(Phase::Visible),
            Phase::Exiting => self.enter(Phase::Hidden),
            Phase::Hidden | Phase::Visible => {}
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        match self.phase {
            Phase::Entering if self.elapsed >= self.timings.enter => self.enter(Phase::Visible),
            Phase::Exiting if self.elapsed >= self.timings.exit => self.enter(Phase::Hidden),
            _ => {}
        }
    }

    /// Visibility in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let ratio = |d: Duration| {
            if d.is_zero() {
                1.0
            } else {
                (self.elapsed.as_secs_f64() / d.as_secs_f64()).min(1.0)
            }
        };
        match self.phase {
            Phase::Hidden => 0.0,
            Phase::Visible => 1.0,
            Phase::Entering => ratio(self.timings.enter),
            Phase::Exiting => 1.0 - ratio(self.timings.exit),
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_follows_table() {
        let mut t = Transition::default();
        assert_eq!(t.phase(), Phase::Hidden);
        t.show();
        assert_eq!(t.phase(), Phase::Entering);
        assert!(t.is_shown());
        t.advance(Duration::from_millis(200));
        assert_eq!(t.phase(), Phase::Visible);
        t.hide();
        assert_eq!(t.phase(), Phase::Exiting);
        assert!(!t.is_shown());
        t.advance(Duration::from_millis(200));
        assert_eq!(t.phase(), Phase::Hidden);
    }

    #[test]
    fn progress_ramps_during_enter() {
        let mut t = Transition::new(TransitionTimings {
            enter: Duration::from_millis(100),
            exit: Duration::from_millis(100),
        });
        t.show();
        t.advance(Duration::from_millis(50));
        assert!((t.progress() - 0.5).abs() < 1e-9);
        t.finish();
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn zero_durations_complete_on_first_advance() {
        let mut t = Transition::new(TransitionTimings {
            enter: Duration::ZERO,
            exit: Duration::ZERO,
        });
        t.show();
        t.advance(Duration::ZERO);
        assert_eq!(t.phase(), Phase::Visible);
    }
}
