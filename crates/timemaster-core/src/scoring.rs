//! Point calculation for tasks and days.
//!
//! ```text
//! task_score  = round(completed_pomodoros × 100 × priority multiplier)
//! total_score = Σ task_score(completed tasks)
//!             + avoided × 50
//!             + yielded × (−25)
//! ```
//!
//! | Quadrant                 | Multiplier |
//! |--------------------------|------------|
//! | urgent-important         | 2.5        |
//! | not-urgent-important     | 2.0        |
//! | urgent-not-important     | 1.5        |
//! | not-urgent-not-important | 1.0        |

use crate::task::{Task, TaskStatus};

/// Base points for one completed pomodoro before the priority multiplier.
pub const POINTS_PER_POMODORO: f64 = 100.0;

/// Awarded for ignoring a distraction.
pub const DISTRACTION_AVOIDED_POINTS: i64 = 50;

/// Applied for yielding to a distraction.
pub const DISTRACTION_YIELD_PENALTY: i64 = -25;

/// Points a task is worth given its current pomodoro count.
pub fn task_score(task: &Task) -> i64 {
    (task.completed_pomodoros as f64 * POINTS_PER_POMODORO * task.priority.multiplier()).round()
        as i64
}

/// Net points from resolved distractions.
pub fn distraction_score(avoided: u32, yielded: u32) -> i64 {
    avoided as i64 * DISTRACTION_AVOIDED_POINTS + yielded as i64 * DISTRACTION_YIELD_PENALTY
}

/// Day total: completed task points plus the distraction balance.
///
/// Only tasks whose status is `completed` contribute.
pub fn total_score<'a, I>(tasks: I, avoided: u32, yielded: u32) -> i64
where
    I: IntoIterator<Item = &'a Task>,
{
    let task_points: i64 = tasks
        .into_iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .map(task_score)
        .sum();
    task_points + distraction_score(avoided, yielded)
}
