use serde::{Deserialize, Serialize};

use crate::distraction::Distraction;
use crate::timer::TimerMode;

/// What the session is doing right now.
///
/// This is the single source of truth for whether the countdown runs and
/// whether a distraction is showing. The timer's active flag is derived from
/// it on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    /// Nothing has been started, or the last task was just completed.
    #[default]
    Idle,
    /// Work interval counting down.
    Running,
    /// Break interval counting down.
    BreakRunning,
    /// Stopped by the player (toggle, reset, skip or yield).
    PausedManual,
    /// Stopped until the distraction is ignored or yielded to.
    PausedForDistraction { distraction: Distraction },
}

impl FlowState {
    /// Counting flow for a timer mode.
    pub fn counting(mode: TimerMode) -> Self {
        if mode.is_break() {
            FlowState::BreakRunning
        } else {
            FlowState::Running
        }
    }

    pub fn is_counting(&self) -> bool {
        matches!(self, FlowState::Running | FlowState::BreakRunning)
    }

    pub fn distraction(&self) -> Option<&Distraction> {
        match self {
            FlowState::PausedForDistraction { distraction } => Some(distraction),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::Running => "running",
            FlowState::BreakRunning => "break",
            FlowState::PausedManual => "paused",
            FlowState::PausedForDistraction { .. } => "distracted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_flow_follows_mode() {
        assert_eq!(FlowState::counting(TimerMode::Work), FlowState::Running);
        assert_eq!(FlowState::counting(TimerMode::LongBreak), FlowState::BreakRunning);
        assert!(FlowState::BreakRunning.is_counting());
        assert!(!FlowState::PausedManual.is_counting());
    }

    #[test]
    fn only_distraction_state_carries_a_distraction() {
        let d = Distraction::from_catalog(0);
        let flow = FlowState::PausedForDistraction {
            distraction: d.clone(),
        };
        assert_eq!(flow.distraction(), Some(&d));
        assert!(!flow.is_counting());
        assert!(FlowState::Idle.distraction().is_none());
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(FlowState::BreakRunning).unwrap();
        assert_eq!(json["state"], "break_running");
    }
}
