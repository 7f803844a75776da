use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::distraction::Distraction;
use crate::mood::MoodEntry;
use crate::session::{FlowState, GameSession};
use crate::timer::TimerMode;

/// Every state change in the engine produces an Event.
/// The presentation layer renders these as notifications; it never
/// needs to diff state to find out what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskAdded {
        task_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    TaskStarted {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        points: i64,
        at: DateTime<Utc>,
    },
    /// A work interval ran out (or was skipped).
    PomodoroCompleted {
        /// Cycle number of the finished work interval.
        cycle: u32,
        next_mode: TimerMode,
        /// Task credited with the pomodoro, if one was active.
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    TimerToggled {
        active: bool,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: TimerMode,
        to: TimerMode,
        at: DateTime<Utc>,
    },
    DistractionFired {
        distraction: Distraction,
        at: DateTime<Utc>,
    },
    DistractionIgnored {
        points: i64,
        at: DateTime<Utc>,
    },
    DistractionYielded {
        points: i64,
        at: DateTime<Utc>,
    },
    DayAdvanced {
        completed_day: u32,
        new_day: u32,
        final_score: i64,
        archived_tasks: usize,
        at: DateTime<Utc>,
    },
    MoodSelected {
        entry: MoodEntry,
    },
    StateSnapshot {
        session: GameSession,
        flow: FlowState,
        active_task_id: Option<String>,
        mode: TimerMode,
        cycle: u32,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short human-readable line for toast-style output.
    pub fn headline(&self) -> String {
        match self {
            Event::TaskAdded { title, .. } => format!("Task added: {title}"),
            Event::TaskStarted { .. } => {
                "Task started. Focus on your task now, the timer is running.".to_string()
            }
            Event::TaskCompleted { points, .. } => {
                format!("Task completed! You earned {points} points.")
            }
            Event::PomodoroCompleted { next_mode, .. } => {
                format!("Pomodoro completed! Time for a {}.", next_mode.label().to_lowercase())
            }
            Event::BreakCompleted { .. } => "Break completed! Ready to focus again?".to_string(),
            Event::TimerToggled { active, .. } => {
                if *active {
                    "Timer running.".to_string()
                } else {
                    "Timer paused.".to_string()
                }
            }
            Event::TimerReset { mode, .. } => format!("{} timer reset.", mode.label()),
            Event::TimerSkipped { from, to, .. } => {
                format!("Skipped {} → {}.", from.label(), to.label())
            }
            Event::DistractionFired { distraction, .. } => {
                format!("{}: {}", distraction.title, distraction.description)
            }
            Event::DistractionIgnored { points, .. } => {
                format!("Distraction ignored. +{points} points for staying focused!")
            }
            Event::DistractionYielded { points, .. } => format!(
                "Yielded to distraction. You lost {} points and the timer is paused.",
                points.abs()
            ),
            Event::DayAdvanced {
                completed_day,
                final_score,
                ..
            } => format!("Day {completed_day} completed! Final score: {final_score}."),
            Event::MoodSelected { entry } => {
                format!("Mood recorded: {} ({}/5)", entry.label, entry.rating)
            }
            Event::StateSnapshot {
                session,
                mode,
                remaining_secs,
                ..
            } => format!(
                "Day {} | score {} | {} {}",
                session.day,
                session.score,
                mode.label(),
                crate::timer::format_mm_ss(*remaining_secs)
            ),
        }
    }
}
