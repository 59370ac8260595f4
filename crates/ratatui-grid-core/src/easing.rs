//! Eased programmatic scrolling.
//!
//! A scroll-to request is stepped by per-frame [`ScrollAnimator::tick`] calls. Every request gets
//! a fresh id from a monotonically increasing counter; stepping a request whose id is no longer
//! the latest reports [`ScrollStep::Superseded`], so a newer scroll-to silently takes over from
//! one that is still in flight.

use std::time::Duration;
use std::time::Instant;

pub const DEFAULT_SCROLL_DURATION: Duration = Duration::from_millis(1000);

/// Quintic ease-in-out over `t` in `[0, 1]`.
pub fn ease_in_out_quint(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        16.0 * t.powi(5)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollStep {
    /// A newer request exists; this one must stop writing the scroll position.
    Superseded,
    Moving(u64),
    Done(u64),
}

#[derive(Clone, Copy, Debug)]
struct ScrollAnimation {
    id: u64,
    from: u64,
    to: u64,
    started: Instant,
}

#[derive(Clone, Debug)]
pub struct ScrollAnimator {
    duration: Duration,
    latest: u64,
    active: Option<ScrollAnimation>,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_DURATION)
    }
}

impl ScrollAnimator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            latest: 0,
            active: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn latest_id(&self) -> u64 {
        self.latest
    }

    /// Starts a new request, superseding any in-flight one. Returns its id.
    pub fn start(&mut self, from: u64, to: u64, now: Instant) -> u64 {
        self.latest += 1;
        self.active = Some(ScrollAnimation {
            id: self.latest,
            from,
            to,
            started: now,
        });
        tracing::trace!(id = self.latest, from, to, "scroll-to started");
        self.latest
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Advances request `id` to `now`.
    pub fn step(&mut self, id: u64, now: Instant) -> ScrollStep {
        let Some(anim) = self.active.filter(|a| a.id == id && id == self.latest) else {
            return ScrollStep::Superseded;
        };

        let elapsed = now.saturating_duration_since(anim.started);
        if self.duration.is_zero() || elapsed >= self.duration {
            self.active = None;
            return ScrollStep::Done(anim.to);
        }

        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = ease_in_out_quint(t);
        let from = anim.from as f64;
        let to = anim.to as f64;
        let pos = (from + (to - from) * eased).round().max(0.0) as u64;
        ScrollStep::Moving(pos)
    }

    /// Steps the latest request, if one is running.
    pub fn tick(&mut self, now: Instant) -> Option<ScrollStep> {
        let id = self.active?.id;
        Some(self.step(id, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_is_symmetric_and_bounded() {
        assert_eq!(ease_in_out_quint(0.0), 0.0);
        assert_eq!(ease_in_out_quint(1.0), 1.0);
        assert!((ease_in_out_quint(0.5) - 0.5).abs() < 1e-9);
        let a = ease_in_out_quint(0.2);
        let b = 1.0 - ease_in_out_quint(0.8);
        assert!((a - b).abs() < 1e-9);
        assert!(ease_in_out_quint(0.1) < 0.1);
    }

    #[test]
    fn animation_moves_monotonically_then_finishes() {
        let mut a = ScrollAnimator::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        let id = a.start(0, 1000, t0);
        let mut last = 0;
        for ms in [100, 300, 500, 700, 900] {
            match a.step(id, t0 + Duration::from_millis(ms)) {
                ScrollStep::Moving(pos) => {
                    assert!(pos >= last);
                    last = pos;
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(a.step(id, t0 + Duration::from_millis(1000)), ScrollStep::Done(1000));
        assert!(!a.is_animating());
    }

    #[test]
    fn newer_request_supersedes_older() {
        let mut a = ScrollAnimator::default();
        let t0 = Instant::now();
        let first = a.start(0, 500, t0);
        let second = a.start(0, 100, t0);
        assert!(second > first);
        assert_eq!(
            a.step(first, t0 + Duration::from_millis(10)),
            ScrollStep::Superseded
        );
        assert!(matches!(
            a.step(second, t0 + Duration::from_millis(10)),
            ScrollStep::Moving(_)
        ));
    }

    #[test]
    fn scrolling_up_interpolates_downwards() {
        let mut a = ScrollAnimator::new(Duration::from_millis(100));
        let t0 = Instant::now();
        a.start(80, 20, t0);
        match a.tick(t0 + Duration::from_millis(50)) {
            Some(ScrollStep::Moving(pos)) => assert!(pos < 80 && pos > 20),
            other => panic!("unexpected {other:?}"),
        }
    }
}
