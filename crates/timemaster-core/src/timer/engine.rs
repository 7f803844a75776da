//! Pomodoro timer state machine.
//!
//! The timer has no internal thread. The caller invokes `tick()` once per
//! second; each tick decrements the countdown while the timer is active.
//!
//! ## Mode Transitions
//!
//! ```text
//! Work ──(0s, cycle % 4 != 0)──> ShortBreak ──(0s)──> Work
//!   └───(0s, cycle % 4 == 0)──> LongBreak  ──(0s)──> Work
//! ```
//!
//! The cycle counter increments each time a work interval finishes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = TimerEngine::new(TimerSettings::default());
//! timer.set_active(true);
//! // Once per second:
//! if let Some(transition) = timer.tick() { /* route completion */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{format_mm_ss, TimerMode, TimerSettings};
use crate::events::Event;

/// A finished interval and where the timer went next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: TimerMode,
    pub to: TimerMode,
    /// Cycle number of the interval that just finished.
    pub cycle: u32,
}

impl Transition {
    /// True when a work interval finished.
    pub fn completed_pomodoro(&self) -> bool {
        self.from == TimerMode::Work
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    settings: TimerSettings,
    mode: TimerMode,
    remaining_secs: u64,
    cycle: u32,
    active: bool,
}

impl TimerEngine {
    /// Starts inactive in `Work` with a full countdown, cycle 1.
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            remaining_secs: settings.duration_secs(TimerMode::Work),
            settings,
            mode: TimerMode::Work,
            cycle: 1,
            active: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn total_secs(&self) -> u64 {
        self.settings.duration_secs(self.mode)
    }

    /// 0.0 .. 1.0 progress within the current mode.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Remaining time as `mm:ss`.
    pub fn display(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the countdown gate. Returns whether the flag changed.
    pub fn set_active(&mut self, active: bool) -> bool {
        let changed = self.active != active;
        self.active = active;
        changed
    }

    /// Reload the current mode's full duration and stop counting.
    /// Mode and cycle are unchanged.
    pub fn reset(&mut self) -> Event {
        self.active = false;
        self.remaining_secs = self.total_secs();
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Finish the current interval now, then stop counting.
    pub fn skip(&mut self) -> Transition {
        self.active = false;
        self.finish_interval()
    }

    /// Call once per second. Returns a transition when the countdown hits 0.
    pub fn tick(&mut self) -> Option<Transition> {
        if !self.active {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.finish_interval());
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish_interval(&mut self) -> Transition {
        let from = self.mode;
        let cycle = self.cycle;
        let to = match from {
            TimerMode::Work => {
                self.cycle += 1;
                self.settings.break_after(cycle)
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
        };
        self.mode = to;
        self.remaining_secs = self.settings.duration_secs(to);
        Transition { from, to, cycle }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_out(timer: &mut TimerEngine) -> Transition {
        timer.set_active(true);
        loop {
            if let Some(t) = timer.tick() {
                return t;
            }
        }
    }

    #[test]
    fn starts_inactive_in_work() {
        let timer = TimerEngine::default();
        assert_eq!(timer.mode(), TimerMode::Work);
        assert_eq!(timer.remaining_secs(), 1500);
        assert_eq!(timer.cycle(), 1);
        assert!(!timer.is_active());
        assert_eq!(timer.display(), "25:00");
    }

    #[test]
    fn inactive_timer_does_not_count() {
        let mut timer = TimerEngine::default();
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining_secs(), 1500);
    }

    #[test]
    fn tick_decrements_one_second() {
        let mut timer = TimerEngine::default();
        timer.set_active(true);
        timer.tick();
        assert_eq!(timer.remaining_secs(), 1499);
        assert_eq!(timer.display(), "24:59");
    }

    #[test]
    fn work_completion_moves_to_short_break() {
        let mut timer = TimerEngine::default();
        let t = run_out(&mut timer);
        assert_eq!(t, Transition { from: TimerMode::Work, to: TimerMode::ShortBreak, cycle: 1 });
        assert!(t.completed_pomodoro());
        assert_eq!(timer.mode(), TimerMode::ShortBreak);
        assert_eq!(timer.remaining_secs(), 300);
        assert_eq!(timer.cycle(), 2);
        assert!(timer.is_active());
    }

    #[test]
    fn fourth_cycle_earns_long_break() {
        let mut timer = TimerEngine::default();
        for _ in 0..3 {
            run_out(&mut timer);
            run_out(&mut timer);
        }
        assert_eq!(timer.cycle(), 4);
        assert_eq!(timer.mode(), TimerMode::Work);

        let t = run_out(&mut timer);
        assert_eq!(t.to, TimerMode::LongBreak);
        assert_eq!(timer.remaining_secs(), 900);
        assert_eq!(timer.cycle(), 5);
    }

    #[test]
    fn break_completion_returns_to_work() {
        let mut timer = TimerEngine::default();
        run_out(&mut timer);
        let t = run_out(&mut timer);
        assert_eq!(t.from, TimerMode::ShortBreak);
        assert!(!t.completed_pomodoro());
        assert_eq!(timer.mode(), TimerMode::Work);
        assert_eq!(timer.remaining_secs(), 1500);
        assert_eq!(timer.cycle(), 2);
    }

    #[test]
    fn reset_reloads_current_mode_and_stops() {
        let mut timer = TimerEngine::default();
        run_out(&mut timer);
        for _ in 0..10 {
            timer.tick();
        }
        timer.reset();
        assert_eq!(timer.mode(), TimerMode::ShortBreak);
        assert_eq!(timer.remaining_secs(), 300);
        assert_eq!(timer.cycle(), 2);
        assert!(!timer.is_active());
    }

    #[test]
    fn skip_transitions_regardless_of_remaining_time() {
        let mut timer = TimerEngine::default();
        timer.set_active(true);
        timer.tick();
        let t = timer.skip();
        assert_eq!(t.from, TimerMode::Work);
        assert_eq!(timer.mode(), TimerMode::ShortBreak);
        assert_eq!(timer.remaining_secs(), 300);
        assert_eq!(timer.cycle(), 2);
        assert!(!timer.is_active());
    }

    #[test]
    fn set_active_touches_only_the_gate() {
        let mut timer = TimerEngine::default();
        assert!(timer.set_active(true));
        assert!(!timer.set_active(true));
        assert!(timer.is_active());
        assert!(timer.set_active(false));
        assert!(!timer.is_active());
        assert_eq!(timer.mode(), TimerMode::Work);
        assert_eq!(timer.remaining_secs(), 1500);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut timer = TimerEngine::new(TimerSettings {
            work_secs: 4,
            short_break_secs: 2,
            long_break_secs: 3,
            long_break_interval: 4,
        });
        assert_eq!(timer.progress(), 0.0);
        timer.set_active(true);
        timer.tick();
        assert!((timer.progress() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_length_interval_reports_zero_progress() {
        let timer = TimerEngine::new(TimerSettings::from_minutes(0, 5, 15, 4));
        assert_eq!(timer.progress(), 0.0);
    }
}
