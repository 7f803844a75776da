//! Session and day bookkeeping.
//!
//! A [`GameSession`] holds one day's score and counters. The
//! [`GameEngine`] owns the session together with the task list, timer and
//! distraction scheduler, and is the only place they are mutated.

mod engine;
mod flow;

pub use engine::{EngineOptions, GameEngine};
pub use flow::FlowState;

use serde::{Deserialize, Serialize};

use crate::scoring;
use crate::task::Task;

/// One day's running score and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Running score; penalties may take it below zero.
    pub score: i64,
    pub tasks_completed: u32,
    pub pomodoros_completed: u32,
    pub distractions_avoided: u32,
    pub distractions_yielded: u32,
    pub day: u32,
}

impl GameSession {
    /// Fresh session for `day` with zeroed counters.
    pub fn for_day(day: u32, score: i64) -> Self {
        Self {
            score,
            tasks_completed: 0,
            pomodoros_completed: 0,
            distractions_avoided: 0,
            distractions_yielded: 0,
            day,
        }
    }

    /// Share of resolved distractions that were ignored (0.0 when none).
    pub fn focus_ratio(&self) -> f64 {
        let total = self.distractions_avoided + self.distractions_yielded;
        if total == 0 {
            return 0.0;
        }
        self.distractions_avoided as f64 / total as f64
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::for_day(1, 0)
    }
}

/// How the end-of-day score is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettlementPolicy {
    /// Recompute from the day's completed tasks and distraction counters.
    #[default]
    Recompute,
    /// Carry the incrementally accumulated running score.
    Carry,
}

impl SettlementPolicy {
    pub fn settle(&self, session: &GameSession, tasks: &[Task]) -> i64 {
        match self {
            SettlementPolicy::Recompute => scoring::total_score(
                tasks,
                session.distractions_avoided,
                session.distractions_yielded,
            ),
            SettlementPolicy::Carry => session.score,
        }
    }
}

/// Result of closing a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub completed_day: u32,
    pub new_day: u32,
    pub final_score: i64,
    /// Completed tasks removed from the board.
    pub archived: Vec<Task>,
}

/// In-memory archive entry for a closed day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    pub final_score: i64,
    /// Session as it stood when the day closed.
    pub session: GameSession,
    pub archived: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Priority, TaskStatus};

    #[test]
    fn new_session_starts_on_day_one() {
        let s = GameSession::default();
        assert_eq!(s.day, 1);
        assert_eq!(s.score, 0);
        assert_eq!(s.tasks_completed, 0);
        assert_eq!(s.focus_ratio(), 0.0);
    }

    #[test]
    fn focus_ratio_counts_ignored_share() {
        let mut s = GameSession::default();
        s.distractions_avoided = 3;
        s.distractions_yielded = 1;
        assert_eq!(s.focus_ratio(), 0.75);
    }

    #[test]
    fn settlement_policies_differ_when_score_diverges() {
        let mut done = Task::new(NewTask::new("a", Priority::UrgentImportant, 1));
        done.completed_pomodoros = 2;
        done.status = TaskStatus::Completed;
        let tasks = vec![done];

        let mut session = GameSession::default();
        session.score = 10;
        session.distractions_avoided = 1;

        assert_eq!(SettlementPolicy::Recompute.settle(&session, &tasks), 550);
        assert_eq!(SettlementPolicy::Carry.settle(&session, &tasks), 10);
    }
}
