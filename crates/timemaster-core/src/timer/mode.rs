use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Work)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Work => "Focus Time",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

/// Interval lengths and the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    /// Every Nth work interval is followed by a long break.
    pub long_break_interval: u32,
}

impl TimerSettings {
    /// Build settings from minute values.
    ///
    /// Uses saturating arithmetic so oversized values cannot overflow.
    pub fn from_minutes(work: u64, short_break: u64, long_break: u64, interval: u32) -> Self {
        Self {
            work_secs: work.saturating_mul(60),
            short_break_secs: short_break.saturating_mul(60),
            long_break_secs: long_break.saturating_mul(60),
            long_break_interval: interval.max(1),
        }
    }

    /// Full duration of a mode in seconds.
    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Work => self.work_secs,
            TimerMode::ShortBreak => self.short_break_secs,
            TimerMode::LongBreak => self.long_break_secs,
        }
    }

    /// Break that follows the given work cycle.
    pub fn break_after(&self, cycle: u32) -> TimerMode {
        if cycle % self.long_break_interval.max(1) == 0 {
            TimerMode::LongBreak
        } else {
            TimerMode::ShortBreak
        }
    }
}

impl Default for TimerSettings {
    /// 25 / 5 / 15 minutes, long break every 4th pomodoro.
    fn default() -> Self {
        Self::from_minutes(25, 5, 15, 4)
    }
}

/// `mm:ss` rendering of a second count.
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
