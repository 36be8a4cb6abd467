//! Visibility state machine for the game-over overlay
//!
//! `Hidden → Entering` when the game-over flag rises, `Entering → Visible`
//! once the opaque delay has elapsed with the flag still up, and back to
//! `Hidden` as soon as the flag drops. Time is passed in by the caller as a
//! monotonic offset so the machine can be driven by a frame loop or a test.

use crate::config::OverlayConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Overlay visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Hidden,
    /// Shown over a dimmed background
    Entering,
    /// Shown over an opaque background
    Visible,
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        self != Visibility::Hidden
    }
}

/// A one-shot action scheduled for a point in time.
///
/// Cancelling clears the deadline, so a cancelled action can never fire late.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayedAction {
    deadline: Option<Duration>,
}

impl DelayedAction {
    /// (Re)schedule the action `delay` after `now`
    pub fn schedule(&mut self, now: Duration, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Edge of the game-over signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// The overlay's visibility state plus its pending opaque transition
#[derive(Debug, Clone)]
pub struct OverlayMachine {
    visibility: Visibility,
    signal: bool,
    opaque: DelayedAction,
    delay: Duration,
}

impl OverlayMachine {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            visibility: Visibility::Hidden,
            signal: false,
            opaque: DelayedAction::default(),
            delay: config.opaque_delay,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the opaque transition is still waiting to fire
    pub fn opaque_pending(&self) -> bool {
        self.opaque.is_pending()
    }

    /// Feed the current game-over flag. Returns the edge if it changed.
    pub fn observe(&mut self, game_over: bool, now: Duration) -> Option<Edge> {
        if game_over == self.signal {
            return None;
        }
        self.signal = game_over;

        if game_over {
            self.visibility = Visibility::Entering;
            self.opaque.schedule(now, self.delay);
            Some(Edge::Rising)
        } else {
            self.visibility = Visibility::Hidden;
            self.opaque.cancel();
            Some(Edge::Falling)
        }
    }

    /// Advance timers. Returns `true` when the overlay just became opaque.
    pub fn tick(&mut self, now: Duration) -> bool {
        if self.visibility == Visibility::Entering && self.opaque.fire_if_due(now) {
            self.visibility = Visibility::Visible;
            return true;
        }
        false
    }

    /// Drop any pending transition; called when the owner goes away
    pub fn teardown(&mut self) {
        self.opaque.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn machine() -> OverlayMachine {
        OverlayMachine::new(&OverlayConfig::default())
    }

    #[test]
    fn test_starts_hidden() {
        let m = machine();
        assert_eq!(m.visibility(), Visibility::Hidden);
        assert!(!m.opaque_pending());
    }

    #[test]
    fn test_enter_then_opaque_after_delay() {
        let mut m = machine();
        assert_eq!(m.observe(true, ms(1000)), Some(Edge::Rising));
        assert_eq!(m.visibility(), Visibility::Entering);

        assert!(!m.tick(ms(1499)));
        assert_eq!(m.visibility(), Visibility::Entering);

        assert!(m.tick(ms(1500)));
        assert_eq!(m.visibility(), Visibility::Visible);

        // Fires once
        assert!(!m.tick(ms(3000)));
    }

    #[test]
    fn test_quick_flip_cancels_opaque() {
        let mut m = machine();
        m.observe(true, ms(0));
        assert_eq!(m.observe(false, ms(200)), Some(Edge::Falling));
        assert_eq!(m.visibility(), Visibility::Hidden);
        assert!(!m.opaque_pending());

        assert!(!m.tick(ms(600)));
        assert_eq!(m.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_repeated_level_is_not_an_edge() {
        let mut m = machine();
        assert_eq!(m.observe(false, ms(0)), None);
        assert_eq!(m.observe(true, ms(10)), Some(Edge::Rising));
        assert_eq!(m.observe(true, ms(20)), None);
    }

    #[test]
    fn test_visible_to_hidden() {
        let mut m = machine();
        m.observe(true, ms(0));
        m.tick(ms(500));
        assert_eq!(m.visibility(), Visibility::Visible);

        m.observe(false, ms(900));
        assert_eq!(m.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_reentry_restarts_delay() {
        let mut m = machine();
        m.observe(true, ms(0));
        m.observe(false, ms(100));
        m.observe(true, ms(300));

        assert!(!m.tick(ms(500)));
        assert!(m.tick(ms(800)));
    }

    #[test]
    fn test_teardown_cancels_pending() {
        let mut m = machine();
        m.observe(true, ms(0));
        m.teardown();
        assert!(!m.tick(ms(10_000)));
        assert_eq!(m.visibility(), Visibility::Entering);
    }

    #[test]
    fn test_delayed_action() {
        let mut action = DelayedAction::default();
        assert!(!action.fire_if_due(ms(0)));

        action.schedule(ms(10), ms(5));
        assert!(action.is_pending());
        assert!(!action.fire_if_due(ms(14)));
        assert!(action.fire_if_due(ms(15)));
        assert!(!action.is_pending());
    }
}
