use timemaster_core::scoring;
use timemaster_core::{NewTask, Priority, Task};

pub fn run(priority: Priority, pomodoros: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut task = Task::new(NewTask::new("score", priority, pomodoros.max(1)));
    task.completed_pomodoros = pomodoros;
    println!("{}", scoring::task_score(&task));
    Ok(())
}
