//! # TimeMaster Core Library
//!
//! Core game logic for TimeMaster, a gamified productivity loop built on an
//! Eisenhower task matrix and a Pomodoro timer. All operations are available
//! through the `timemaster` CLI; the library itself has no I/O loop.
//!
//! ## Architecture
//!
//! - **Game Engine**: owns tasks, the session counters, the timer and the
//!   distraction scheduler. The caller drives it with `tick()` once per second
//!   and `poll_distraction()` on the distraction interval
//! - **Timer**: Pomodoro countdown with work, short break and long break modes
//! - **Scoring**: pure point arithmetic for tasks and distractions
//! - **Storage**: TOML configuration under the user's config directory
//!
//! ## Key Components
//!
//! - [`GameEngine`]: the session state machine
//! - [`TimerEngine`]: the countdown
//! - [`DistractionScheduler`]: the random interruption gate
//! - [`Config`]: application configuration management

pub mod distraction;
pub mod error;
pub mod events;
pub mod mood;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod task;
pub mod timer;

pub use distraction::{Distraction, DistractionScheduler, DistractionSettings};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use mood::{MoodEntry, MoodLabel};
pub use session::{
    DayRecord, DaySummary, EngineOptions, FlowState, GameEngine, GameSession, SettlementPolicy,
};
pub use storage::Config;
pub use task::{NewTask, Priority, Task, TaskStatus, TaskTransitionError};
pub use timer::{TimerEngine, TimerMode, TimerSettings, Transition};
