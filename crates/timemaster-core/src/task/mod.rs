//! Task types and lifecycle transitions.
//!
//! Tasks are classified on the Eisenhower matrix and move through a strict
//! one-way lifecycle:
//!
//! ```text
//!   PENDING ─────────> IN-PROGRESS ─────────> COMPLETED
//!     ^    start                    complete
//!     |
//!     +----- (initial state / task creation)
//! ```
//!
//! There is no backward path and no cancel path. Which task is in progress
//! is owned by the session engine; this module only validates single-task
//! transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Largest estimate accepted at the creation boundary.
pub const MAX_ESTIMATED_POMODOROS: u32 = 8;

/// Eisenhower matrix quadrant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Do first
    UrgentImportant,
    /// Schedule
    NotUrgentImportant,
    /// Delegate
    UrgentNotImportant,
    /// Eliminate
    NotUrgentNotImportant,
}

impl Priority {
    /// All quadrants in matrix display order.
    pub const ALL: [Priority; 4] = [
        Priority::UrgentImportant,
        Priority::NotUrgentImportant,
        Priority::UrgentNotImportant,
        Priority::NotUrgentNotImportant,
    ];

    /// Score multiplier applied per completed pomodoro.
    pub fn multiplier(&self) -> f64 {
        match self {
            Priority::UrgentImportant => 2.5,
            Priority::NotUrgentImportant => 2.0,
            Priority::UrgentNotImportant => 1.5,
            Priority::NotUrgentNotImportant => 1.0,
        }
    }

    /// Short quadrant label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::UrgentImportant => "Urgent & Important",
            Priority::NotUrgentImportant => "Important",
            Priority::UrgentNotImportant => "Urgent",
            Priority::NotUrgentNotImportant => "Neither",
        }
    }

    /// Matrix advice for the quadrant.
    pub fn advice(&self) -> &'static str {
        match self {
            Priority::UrgentImportant => "Do First",
            Priority::NotUrgentImportant => "Schedule",
            Priority::UrgentNotImportant => "Delegate",
            Priority::NotUrgentNotImportant => "Eliminate",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::UrgentImportant => "urgent-important",
            Priority::NotUrgentImportant => "not-urgent-important",
            Priority::UrgentNotImportant => "urgent-not-important",
            Priority::NotUrgentNotImportant => "not-urgent-not-important",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::UrgentImportant
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    /// Accepts the kebab-case names plus the short aliases `ui`, `ni`, `un`, `nn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgent-important" | "ui" | "q1" => Ok(Priority::UrgentImportant),
            "not-urgent-important" | "ni" | "q2" => Ok(Priority::NotUrgentImportant),
            "urgent-not-important" | "un" | "q3" => Ok(Priority::UrgentNotImportant),
            "not-urgent-not-important" | "nn" | "q4" => Ok(Priority::NotUrgentNotImportant),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("unknown priority '{other}'"),
            }),
        }
    }
}

/// Task status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is waiting to be started (initial state)
    Pending,
    /// Task is the active task
    InProgress,
    /// Task is completed (terminal state)
    Completed,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        matches!(
            (self, to),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Completed)
        )
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub estimated_pomodoros: u32,
}

impl NewTask {
    pub fn new(title: impl Into<String>, priority: Priority, estimated_pomodoros: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority,
            estimated_pomodoros,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Boundary check applied before the engine sees the input.
    ///
    /// The engine itself accepts whatever it is handed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "title".into(),
            });
        }
        if !(1..=MAX_ESTIMATED_POMODOROS).contains(&self.estimated_pomodoros) {
            return Err(ValidationError::OutOfRange {
                field: "estimated_pomodoros".into(),
                min: 1,
                max: MAX_ESTIMATED_POMODOROS as i64,
                value: self.estimated_pomodoros as i64,
            });
        }
        Ok(())
    }
}

/// A unit of work on the matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Matrix quadrant, fixed at creation
    pub priority: Priority,
    /// Estimated number of pomodoros
    pub estimated_pomodoros: u32,
    /// Number of completed pomodoros (may exceed the estimate)
    pub completed_pomodoros: u32,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set exactly once, on completion
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending task from validated input.
    pub fn new(input: NewTask) -> Self {
        let now = Utc::now();
        Task {
            id: format!("task-{}", uuid::Uuid::new_v4()),
            title: input.title,
            description: input.description.filter(|d| !d.trim().is_empty()),
            priority: input.priority,
            estimated_pomodoros: input.estimated_pomodoros,
            completed_pomodoros: 0,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Transition to a new status.
    ///
    /// Returns an error if the transition is invalid.
    pub fn transition_to(&mut self, new_status: TaskStatus) -> Result<(), TaskTransitionError> {
        if !self.status.can_transition_to(&new_status) {
            return Err(TaskTransitionError {
                from: self.status,
                to: new_status,
            });
        }

        let now = Utc::now();
        if new_status == TaskStatus::Completed {
            self.completed_at = Some(now);
        }
        self.status = new_status;
        self.updated_at = now;
        Ok(())
    }

    /// Count one finished pomodoro against this task.
    pub fn record_pomodoro(&mut self) {
        self.completed_pomodoros += 1;
        self.updated_at = Utc::now();
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Calculate completion percentage (0.0 to 1.0).
    pub fn completion_percentage(&self) -> f64 {
        if self.estimated_pomodoros == 0 {
            0.0
        } else {
            (self.completed_pomodoros as f64 / self.estimated_pomodoros as f64).min(1.0)
        }
    }
}

/// Error returned when an invalid status transition is attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl fmt::Display for TaskTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid status transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for TaskTransitionError {}

/// Starter tasks, one per quadrant.
pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task::new(
            NewTask::new("Complete math homework", Priority::UrgentImportant, 3)
                .with_description("Solve problems from chapter 5"),
        ),
        Task::new(
            NewTask::new(
                "Prepare for history presentation",
                Priority::NotUrgentImportant,
                4,
            )
            .with_description("Research and create slides"),
        ),
        Task::new(NewTask::new(
            "Reply to club emails",
            Priority::UrgentNotImportant,
            1,
        )),
        Task::new(NewTask::new(
            "Check social media updates",
            Priority::NotUrgentNotImportant,
            1,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::new(NewTask::new("Write report", Priority::UrgentImportant, 2))
    }

    #[test]
    fn new_task_is_pending() {
        let t = task();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.completed_pomodoros, 0);
        assert!(t.completed_at.is_none());
        assert!(t.id.starts_with("task-"));
        assert_eq!(t.created_at, t.updated_at);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(task().id, task().id);
    }

    #[test]
    fn blank_description_is_dropped() {
        let t = Task::new(NewTask::new("x", Priority::UrgentImportant, 1).with_description("  "));
        assert!(t.description.is_none());
    }

    #[test]
    fn forward_transitions_only() {
        assert!(TaskStatus::Pending.can_transition_to(&TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_transition_to(&TaskStatus::Completed));
        assert!(!TaskStatus::Pending.can_transition_to(&TaskStatus::Completed));
        assert!(!TaskStatus::InProgress.can_transition_to(&TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(&TaskStatus::InProgress));
        assert!(!TaskStatus::Completed.can_transition_to(&TaskStatus::Pending));
    }

    #[test]
    fn completion_stamps_completed_at() {
        let mut t = task();
        t.transition_to(TaskStatus::InProgress).unwrap();
        assert!(t.completed_at.is_none());
        t.transition_to(TaskStatus::Completed).unwrap();
        assert!(t.completed_at.is_some());
        assert!(t.updated_at >= t.created_at);
    }

    #[test]
    fn invalid_transition_leaves_task_unchanged() {
        let mut t = task();
        let before = t.clone();
        let err = t.transition_to(TaskStatus::Completed).unwrap_err();
        assert_eq!(err.from, TaskStatus::Pending);
        assert_eq!(err.to, TaskStatus::Completed);
        assert_eq!(t, before);
    }

    #[test]
    fn pomodoros_may_exceed_estimate() {
        let mut t = task();
        for _ in 0..5 {
            t.record_pomodoro();
        }
        assert_eq!(t.completed_pomodoros, 5);
        assert_eq!(t.completion_percentage(), 1.0);
    }

    #[test]
    fn validate_rejects_blank_title() {
        let input = NewTask::new("   ", Priority::UrgentImportant, 1);
        assert_eq!(
            input.validate(),
            Err(ValidationError::Empty {
                field: "title".into()
            })
        );
    }

    #[test]
    fn validate_rejects_estimate_out_of_range() {
        assert!(NewTask::new("a", Priority::UrgentImportant, 0).validate().is_err());
        assert!(NewTask::new("a", Priority::UrgentImportant, 9).validate().is_err());
        assert!(NewTask::new("a", Priority::UrgentImportant, 8).validate().is_ok());
    }

    #[test]
    fn priority_parses_names_and_aliases() {
        assert_eq!("urgent-important".parse::<Priority>().unwrap(), Priority::UrgentImportant);
        assert_eq!("NI".parse::<Priority>().unwrap(), Priority::NotUrgentImportant);
        assert_eq!("q3".parse::<Priority>().unwrap(), Priority::UrgentNotImportant);
        assert!("someday".parse::<Priority>().is_err());
    }

    #[test]
    fn priority_serializes_kebab_case() {
        let json = serde_json::to_string(&Priority::NotUrgentNotImportant).unwrap();
        assert_eq!(json, "\"not-urgent-not-important\"");
        let status = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(status, "\"in-progress\"");
    }

    #[test]
    fn samples_cover_every_quadrant() {
        let samples = sample_tasks();
        assert_eq!(samples.len(), 4);
        for p in Priority::ALL {
            assert!(samples.iter().any(|t| t.priority == p));
        }
        assert!(samples.iter().all(|t| t.status == TaskStatus::Pending));
    }
}
