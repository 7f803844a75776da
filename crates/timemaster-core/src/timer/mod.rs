mod engine;
mod mode;

pub use engine::{TimerEngine, Transition};
pub use mode::{format_mm_ss, TimerMode, TimerSettings};
