//! Caret blink timer
//!
//! The caret is solid right after any key press and starts blinking once the
//! user is idle. Resetting cancels the pending tick and schedules a new one.

use std::time::{Duration, Instant};

/// Glyph drawn when the caret is on
pub const CARET_ON: &str = "_";
/// Glyph drawn when the caret is off
pub const CARET_OFF: &str = " ";

#[derive(Debug, Clone)]
pub struct Caret {
    visible: bool,
    interval: Duration,
    next_toggle: Instant,
}

impl Caret {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            visible: true,
            interval,
            next_toggle: now + interval,
        }
    }

    /// Make the caret solid and restart the blink period
    pub fn reset(&mut self, interval: Duration, now: Instant) {
        self.visible = true;
        self.interval = interval;
        self.next_toggle = now + interval;
    }

    /// Toggle if the period has elapsed. Returns true when the caret changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_toggle {
            return false;
        }
        self.visible = !self.visible;
        // A long stall only produces one toggle
        self.next_toggle = now + self.interval;
        true
    }

    /// Time left until the next toggle
    pub fn time_to_next(&self, now: Instant) -> Duration {
        self.next_toggle.saturating_duration_since(now)
    }

    #[allow(dead_code)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn glyph(&self) -> &'static str {
        if self.visible {
            CARET_ON
        } else {
            CARET_OFF
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blinks_after_interval() {
        let start = Instant::now();
        let interval = Duration::from_millis(300);
        let mut caret = Caret::new(interval, start);
        assert!(caret.is_visible());

        assert!(!caret.tick(start + Duration::from_millis(299)));
        assert!(caret.is_visible());

        assert!(caret.tick(start + interval));
        assert!(!caret.is_visible());
        assert_eq!(caret.glyph(), CARET_OFF);

        assert!(caret.tick(start + interval * 2));
        assert_eq!(caret.glyph(), CARET_ON);
    }

    #[test]
    fn test_reset_makes_solid() {
        let start = Instant::now();
        let mut caret = Caret::new(Duration::from_millis(100), start);
        caret.tick(start + Duration::from_millis(100));
        assert!(!caret.is_visible());

        let later = start + Duration::from_millis(150);
        caret.reset(Duration::from_secs(1), later);
        assert!(caret.is_visible());

        // Old deadline is cancelled
        assert!(!caret.tick(later + Duration::from_millis(500)));
        assert_eq!(caret.time_to_next(later + Duration::from_millis(500)), Duration::from_millis(500));
        assert!(caret.tick(later + Duration::from_secs(1)));
    }
}
