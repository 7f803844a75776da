//! Game engine: tasks, timer, distractions and the day cycle.
//!
//! The engine is a plain struct driven by its caller. It never sleeps or
//! spawns; the host calls [`GameEngine::tick`] once per second and
//! [`GameEngine::poll_distraction`] on the distraction interval while the
//! flow is counting.
//!
//! ## Flow Transitions
//!
//! ```text
//! Idle ──start/toggle──> Running <──ignore── PausedForDistraction
//!   ^                   │   ^                       ^
//!   │ complete          │   │ break over            │ poll fires
//!   │                   v   │                       │
//!   +──────────────── BreakRunning ─────────────────+
//!
//! Running/BreakRunning ──toggle/reset/skip/yield──> PausedManual ──toggle──> counting
//! ```
//!
//! The timer's active flag is written only by `set_flow`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flow::FlowState;
use super::{DayRecord, DaySummary, GameSession, SettlementPolicy};
use crate::distraction::{Distraction, DistractionScheduler, DistractionSettings};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::mood::{self, MoodLabel};
use crate::scoring::{self, DISTRACTION_AVOIDED_POINTS, DISTRACTION_YIELD_PENALTY};
use crate::storage::Config;
use crate::task::{self, NewTask, Priority, Task, TaskStatus};
use crate::timer::{TimerEngine, TimerSettings, Transition};

/// Construction parameters for [`GameEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    pub timer: TimerSettings,
    pub distraction: DistractionSettings,
    pub settlement: SettlementPolicy,
    /// Seed for the distraction RNG; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Start with the four starter tasks on the board.
    pub sample_tasks: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            timer: TimerSettings::default(),
            distraction: DistractionSettings::default(),
            settlement: SettlementPolicy::default(),
            seed: None,
            sample_tasks: false,
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timer: config.timer_settings(),
            distraction: config.distraction_settings(),
            settlement: config.game.settlement,
            seed: None,
            sample_tasks: config.game.seed_sample_tasks,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone)]
pub struct GameEngine {
    tasks: Vec<Task>,
    session: GameSession,
    active_task_id: Option<String>,
    flow: FlowState,
    timer: TimerEngine,
    distractions: DistractionScheduler,
    settlement: SettlementPolicy,
    history: Vec<DayRecord>,
}

impl GameEngine {
    pub fn new(options: EngineOptions) -> Self {
        let tasks = if options.sample_tasks {
            task::sample_tasks()
        } else {
            Vec::new()
        };
        Self {
            tasks,
            session: GameSession::default(),
            active_task_id: None,
            flow: FlowState::Idle,
            timer: TimerEngine::new(options.timer),
            distractions: DistractionScheduler::new(options.distraction, options.seed),
            settlement: options.settlement,
            history: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Open tasks of one matrix quadrant, in insertion order.
    pub fn tasks_by_priority(&self, priority: Priority) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(move |t| t.priority == priority && !t.is_completed())
    }

    pub fn completed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_completed())
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.active_task_id.as_deref()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active_task_id.as_deref().and_then(|id| self.task(id))
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    pub fn pending_distraction(&self) -> Option<&Distraction> {
        self.flow.distraction()
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn settlement(&self) -> SettlementPolicy {
        self.settlement
    }

    /// Closed days, oldest first.
    pub fn history(&self) -> &[DayRecord] {
        &self.history
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            session: self.session.clone(),
            flow: self.flow.clone(),
            active_task_id: self.active_task_id.clone(),
            mode: self.timer.mode(),
            cycle: self.timer.cycle(),
            remaining_secs: self.timer.remaining_secs(),
            total_secs: self.timer.total_secs(),
            progress: self.timer.progress(),
            at: Utc::now(),
        }
    }

    // ── Task lifecycle ───────────────────────────────────────────────

    /// Append a pending task. Input is not validated here; callers check
    /// it with [`NewTask::validate`] first.
    pub fn add_task(&mut self, input: NewTask) -> (String, Event) {
        let task = Task::new(input);
        let id = task.id.clone();
        let event = Event::TaskAdded {
            task_id: id.clone(),
            title: task.title.clone(),
            at: task.created_at,
        };
        tracing::info!(task_id = %id, priority = %task.priority, "task added");
        self.tasks.push(task);
        (id, event)
    }

    /// Make `id` the active task and start the countdown.
    ///
    /// A task left in progress by a previous day is re-adopted rather than
    /// transitioned again.
    pub fn start_task(&mut self, id: &str) -> Result<Vec<Event>> {
        self.ensure_no_distraction()?;
        if let Some(active) = &self.active_task_id {
            tracing::warn!(requested = %id, active = %active, "start refused: task already in progress");
            return Err(CoreError::Conflict {
                active: active.clone(),
            });
        }

        let idx = self.index_of(id)?;
        if self.tasks[idx].status == TaskStatus::InProgress {
            self.tasks[idx].updated_at = Utc::now();
        } else {
            if let Some(carried) = self
                .tasks
                .iter()
                .find(|t| t.status == TaskStatus::InProgress)
            {
                return Err(CoreError::Conflict {
                    active: carried.id.clone(),
                });
            }
            self.tasks[idx].transition_to(TaskStatus::InProgress)?;
        }

        self.active_task_id = Some(id.to_string());
        self.set_flow(FlowState::counting(self.timer.mode()));
        tracing::info!(task_id = %id, mode = ?self.timer.mode(), "task started");
        Ok(vec![Event::TaskStarted {
            task_id: id.to_string(),
            at: Utc::now(),
        }])
    }

    /// Mark `id` completed and bank its points.
    ///
    /// Clears the active slot and stops the countdown only when `id` is the
    /// active task.
    pub fn complete_task(&mut self, id: &str) -> Result<Vec<Event>> {
        self.ensure_no_distraction()?;
        let idx = self.index_of(id)?;
        self.tasks[idx].transition_to(TaskStatus::Completed)?;

        let points = scoring::task_score(&self.tasks[idx]);
        self.session.score += points;
        self.session.tasks_completed += 1;

        if self.active_task_id.as_deref() == Some(id) {
            self.active_task_id = None;
            self.set_flow(FlowState::Idle);
        }

        tracing::info!(task_id = %id, points, score = self.session.score, "task completed");
        Ok(vec![Event::TaskCompleted {
            task_id: id.to_string(),
            points,
            at: Utc::now(),
        }])
    }

    /// Credit a finished pomodoro to the active task.
    ///
    /// Returns the credited task id, or `None` (and changes nothing) when no
    /// task is active.
    pub fn complete_pomodoro(&mut self) -> Option<String> {
        let id = self.active_task_id.clone()?;
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.record_pomodoro();
        self.session.pomodoros_completed += 1;
        tracing::debug!(task_id = %id, count = task.completed_pomodoros, "pomodoro credited");
        Some(id)
    }

    /// A break ran out: resume counting in work mode.
    ///
    /// Refused while a distraction is showing; only ignore or yield end it.
    pub fn complete_break(&mut self) -> Result<()> {
        self.ensure_no_distraction()?;
        self.set_flow(FlowState::counting(self.timer.mode()));
        Ok(())
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.flow.is_counting() {
            return Vec::new();
        }
        match self.timer.tick() {
            Some(transition) => self.route_transition(transition, true),
            None => Vec::new(),
        }
    }

    /// Start or pause the countdown.
    pub fn toggle_timer(&mut self) -> Result<Event> {
        self.ensure_no_distraction()?;
        let next = if self.flow.is_counting() {
            FlowState::PausedManual
        } else {
            FlowState::counting(self.timer.mode())
        };
        self.set_flow(next);
        Ok(Event::TimerToggled {
            active: self.timer.is_active(),
            at: Utc::now(),
        })
    }

    /// Reload the current interval and stop counting.
    pub fn reset_timer(&mut self) -> Result<Event> {
        self.ensure_no_distraction()?;
        let event = self.timer.reset();
        self.set_flow(self.stopped_flow());
        Ok(event)
    }

    /// Finish the current interval immediately and stop counting.
    pub fn skip_timer(&mut self) -> Result<Vec<Event>> {
        self.ensure_no_distraction()?;
        let transition = self.timer.skip();
        self.set_flow(self.stopped_flow());
        let mut events = vec![Event::TimerSkipped {
            from: transition.from,
            to: transition.to,
            at: Utc::now(),
        }];
        events.extend(self.route_transition(transition, false));
        Ok(events)
    }

    // ── Distractions ─────────────────────────────────────────────────

    /// Roll for a distraction. Only rolls while the countdown is running.
    pub fn poll_distraction(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.flow.is_counting() {
            return None;
        }
        let distraction = self.distractions.poll(now)?;
        Some(self.show_distraction(distraction, now))
    }

    /// Fire a distraction now regardless of cooldown. Only while counting.
    pub fn force_distraction(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.flow.is_counting() {
            return None;
        }
        let distraction = self.distractions.fire_now(now);
        Some(self.show_distraction(distraction, now))
    }

    /// Stay focused: +50 and the interrupted countdown resumes.
    pub fn ignore_distraction(&mut self) -> Result<Event> {
        if self.pending_distraction().is_none() {
            return Err(CoreError::NoDistraction);
        }
        self.session.distractions_avoided += 1;
        self.session.score += DISTRACTION_AVOIDED_POINTS;
        self.set_flow(FlowState::counting(self.timer.mode()));
        tracing::info!(score = self.session.score, "distraction ignored");
        Ok(Event::DistractionIgnored {
            points: DISTRACTION_AVOIDED_POINTS,
            at: Utc::now(),
        })
    }

    /// Give in: −25 and the timer stays stopped.
    pub fn yield_to_distraction(&mut self) -> Result<Event> {
        if self.pending_distraction().is_none() {
            return Err(CoreError::NoDistraction);
        }
        self.session.distractions_yielded += 1;
        self.session.score += DISTRACTION_YIELD_PENALTY;
        self.set_flow(FlowState::PausedManual);
        tracing::info!(score = self.session.score, "yielded to distraction");
        Ok(Event::DistractionYielded {
            points: DISTRACTION_YIELD_PENALTY,
            at: Utc::now(),
        })
    }

    /// Forget when the last distraction fired.
    pub fn reset_distraction_timer(&mut self) {
        self.distractions.reset();
    }

    // ── Day cycle ────────────────────────────────────────────────────

    /// Settle the day, archive completed tasks and open the next day.
    ///
    /// The settlement reads the counters before they are reset.
    pub fn advance_to_next_day(&mut self) -> (DaySummary, Event) {
        let final_score = self.settlement.settle(&self.session, &self.tasks);
        let closing = self.session.clone();

        let (archived, open): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(Task::is_completed);
        self.tasks = open;

        self.session = GameSession::for_day(closing.day + 1, final_score);
        self.active_task_id = None;
        self.set_flow(FlowState::Idle);
        self.reset_distraction_timer();

        self.history.push(DayRecord {
            final_score,
            session: closing.clone(),
            archived: archived.clone(),
        });

        tracing::info!(
            day = closing.day,
            final_score,
            archived = archived.len(),
            policy = ?self.settlement,
            "day settled"
        );

        let summary = DaySummary {
            completed_day: closing.day,
            new_day: self.session.day,
            final_score,
            archived,
        };
        let event = Event::DayAdvanced {
            completed_day: summary.completed_day,
            new_day: summary.new_day,
            final_score,
            archived_tasks: summary.archived.len(),
            at: Utc::now(),
        };
        (summary, event)
    }

    // ── Mood ─────────────────────────────────────────────────────────

    /// Record a mood check-in. Session state is unaffected.
    pub fn select_mood(&self, rating: u8, label: MoodLabel) -> Result<Event> {
        let entry = mood::select_mood(rating, label)?;
        Ok(Event::MoodSelected { entry })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The one place the timer's active flag is written.
    fn set_flow(&mut self, flow: FlowState) {
        if self.flow != flow {
            tracing::debug!(from = self.flow.label(), to = flow.label(), "flow changed");
        }
        self.timer.set_active(flow.is_counting());
        self.flow = flow;
    }

    fn stopped_flow(&self) -> FlowState {
        match self.flow {
            FlowState::Idle => FlowState::Idle,
            _ => FlowState::PausedManual,
        }
    }

    fn ensure_no_distraction(&self) -> Result<()> {
        if self.pending_distraction().is_some() {
            return Err(CoreError::DistractionPending);
        }
        Ok(())
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| {
                tracing::warn!(task_id = %id, "unknown task id");
                CoreError::TaskNotFound(id.to_string())
            })
    }

    fn show_distraction(&mut self, distraction: Distraction, now: DateTime<Utc>) -> Event {
        tracing::info!(title = %distraction.title, "distraction fired");
        self.set_flow(FlowState::PausedForDistraction {
            distraction: distraction.clone(),
        });
        Event::DistractionFired {
            distraction,
            at: now,
        }
    }

    /// Feed a finished interval back into the session.
    ///
    /// `natural` is true when the countdown ran out; a skip leaves the timer
    /// stopped instead of rolling into the next interval.
    fn route_transition(&mut self, transition: Transition, natural: bool) -> Vec<Event> {
        let at = Utc::now();
        if transition.completed_pomodoro() {
            let task_id = self.complete_pomodoro();
            if natural {
                self.set_flow(FlowState::BreakRunning);
            }
            vec![Event::PomodoroCompleted {
                cycle: transition.cycle,
                next_mode: transition.to,
                task_id,
                at,
            }]
        } else {
            // A natural end only happens while counting, so nothing is pending.
            if natural {
                self.set_flow(FlowState::counting(self.timer.mode()));
            }
            vec![Event::BreakCompleted {
                mode: transition.from,
                at,
            }]
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
