//! Interactive day loop.
//!
//! One tokio task multiplexes three sources with `select!`: stdin lines, a
//! one second countdown tick and the distraction poll. Each stdin line is
//! parsed with clap into a [`LineCommand`] and applied to the engine.

use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use timemaster_core::{
    Config, CoreError, EngineOptions, Event, GameEngine, MoodLabel, NewTask, Priority,
};

const HELP: &str = "\
Commands:
  add <title> [-p PRIORITY] [-n POMODOROS] [-d \"DESCRIPTION\"]
                      add a task (priority: ui, ni, un, nn or q1..q4)
  list                show the task matrix
  start <task>        start a task (list number or id prefix)
  complete <task>     complete an in-progress task
  toggle              start or pause the timer
  reset               reload the current interval
  skip                finish the current interval now
  ignore              stay focused on a distraction (+50)
  yield               give in to a distraction (-25)
  distract            trigger a distraction now
  end-day             settle the score and start the next day
  mood <1-5>          record how the day went
  status [--json]     show score, timer and counters
  help                show this help
  quit                leave the game";

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct LineCli {
    #[command(subcommand)]
    command: LineCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum LineCommand {
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        #[arg(long, short, default_value_t = Priority::UrgentImportant)]
        priority: Priority,
        #[arg(long, short = 'n', default_value_t = 1)]
        pomodoros: u32,
        #[arg(long, short)]
        desc: Option<String>,
    },
    List,
    Start {
        task: String,
    },
    Complete {
        task: String,
    },
    Toggle,
    Reset,
    Skip,
    Ignore,
    Yield,
    Distract,
    EndDay,
    Mood {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
    },
    Status {
        #[arg(long)]
        json: bool,
    },
    Help,
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

pub fn run(seed: Option<u64>, no_samples: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut options = EngineOptions::from_config(&config);
    if let Some(seed) = seed {
        options = options.with_seed(seed);
    }
    if no_samples {
        options.sample_tasks = false;
    }
    let poll_every = Duration::from_secs(config.distraction.poll_interval_secs);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(play(GameEngine::new(options), poll_every))
}

async fn play(
    mut engine: GameEngine,
    poll_every: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let second = Duration::from_secs(1);
    let mut tick = interval_at(Instant::now() + second, second);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut poll = interval_at(Instant::now() + poll_every, poll_every);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    println!("Welcome to TimeMaster. Day {} begins.", engine.session().day);
    println!("{HELP}");
    print_board(&engine);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if handle_line(&mut engine, &line) == Control::Quit {
                    break;
                }
            }
            _ = tick.tick() => {
                for event in engine.tick() {
                    announce(&event);
                }
            }
            _ = poll.tick() => {
                if let Some(event) = engine.poll_distraction(Utc::now()) {
                    announce_distraction(&event);
                }
            }
        }
    }

    println!("Final score: {}. See you tomorrow.", engine.session().score);
    Ok(())
}

fn handle_line(engine: &mut GameEngine, line: &str) -> Control {
    let command = match parse_line(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Control::Continue,
        Err(message) => {
            eprintln!("{message}");
            return Control::Continue;
        }
    };
    match execute(engine, command) {
        Ok(control) => control,
        Err(e) => {
            tracing::debug!(error = %e, "line command refused");
            eprintln!("warning: {e}");
            Control::Continue
        }
    }
}

/// Parse one input line. Blank lines yield `None`.
fn parse_line(line: &str) -> Result<Option<LineCommand>, String> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    LineCli::try_parse_from(words)
        .map(|cli| Some(cli.command))
        .map_err(|e| e.to_string().trim_end().to_string())
}

/// Whitespace split that keeps double-quoted runs together.
///
/// Quotes are removed; an empty pair `""` still yields an empty word.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn execute(engine: &mut GameEngine, command: LineCommand) -> Result<Control, CoreError> {
    match command {
        LineCommand::Add {
            title,
            priority,
            pomodoros,
            desc,
        } => {
            let mut input = NewTask::new(title.join(" "), priority, pomodoros);
            if let Some(desc) = desc {
                input = input.with_description(desc);
            }
            input.validate()?;
            let (_, event) = engine.add_task(input);
            announce(&event);
        }
        LineCommand::List => print_board(engine),
        LineCommand::Start { task } => {
            let id = resolve_task(engine, &task)?;
            engine.start_task(&id)?.iter().for_each(announce);
        }
        LineCommand::Complete { task } => {
            let id = resolve_task(engine, &task)?;
            engine.complete_task(&id)?.iter().for_each(announce);
        }
        LineCommand::Toggle => announce(&engine.toggle_timer()?),
        LineCommand::Reset => announce(&engine.reset_timer()?),
        LineCommand::Skip => engine.skip_timer()?.iter().for_each(announce),
        LineCommand::Ignore => announce(&engine.ignore_distraction()?),
        LineCommand::Yield => announce(&engine.yield_to_distraction()?),
        LineCommand::Distract => match engine.force_distraction(Utc::now()) {
            Some(event) => announce_distraction(&event),
            None => eprintln!("warning: distractions only arrive while the timer runs"),
        },
        LineCommand::EndDay => {
            let (summary, event) = engine.advance_to_next_day();
            announce(&event);
            println!(
                "{} completed task(s) archived. Day {} begins.",
                summary.archived.len(),
                summary.new_day
            );
            println!("How did today go? Type 'mood <1-5>'.");
        }
        LineCommand::Mood { rating } => {
            let label = MoodLabel::for_rating(rating).ok_or_else(|| {
                timemaster_core::ValidationError::OutOfRange {
                    field: "rating".into(),
                    min: 1,
                    max: 5,
                    value: i64::from(rating),
                }
            })?;
            announce(&engine.select_mood(rating, label)?);
        }
        LineCommand::Status { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            } else {
                print_status(engine);
            }
        }
        LineCommand::Help => println!("{HELP}"),
        LineCommand::Quit => return Ok(Control::Quit),
    }
    Ok(Control::Continue)
}

/// Resolve a task reference: 1-based list number, full id or unique id prefix.
fn resolve_task(engine: &GameEngine, reference: &str) -> Result<String, CoreError> {
    let not_found = || CoreError::TaskNotFound(reference.to_string());
    let tasks = engine.tasks();

    if let Ok(n) = reference.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| tasks.get(i))
            .map(|t| t.id.clone())
            .ok_or_else(not_found);
    }
    if let Some(task) = engine.task(reference) {
        return Ok(task.id.clone());
    }

    let mut matches = tasks.iter().filter(|t| {
        t.id.starts_with(reference)
            || t.id
                .strip_prefix("task-")
                .is_some_and(|rest| rest.starts_with(reference))
    });
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id.clone()),
        _ => Err(not_found()),
    }
}

fn announce(event: &Event) {
    println!("» {}", event.headline());
}

fn announce_distraction(event: &Event) {
    announce(event);
    println!("  The timer is paused. 'ignore' to stay focused (+50) or 'yield' to give in (-25).");
}

fn print_board(engine: &GameEngine) {
    for priority in Priority::ALL {
        println!(
            "\n{} (x{}) - {}",
            priority.label(),
            priority.multiplier(),
            priority.advice()
        );
        let mut empty = true;
        for (i, task) in engine
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.priority == priority && !t.is_completed())
        {
            empty = false;
            let marker = if engine.active_task_id() == Some(task.id.as_str()) {
                "*"
            } else {
                " "
            };
            println!(
                " {marker}[{}] {} ({}/{} pomodoros, {:.0}%, {})",
                i + 1,
                task.title,
                task.completed_pomodoros,
                task.estimated_pomodoros,
                task.completion_percentage() * 100.0,
                task.status
            );
            if let Some(desc) = &task.description {
                println!("       {desc}");
            }
        }
        if empty {
            println!("    (no tasks)");
        }
    }

    let completed: Vec<_> = engine.completed_tasks().collect();
    if !completed.is_empty() {
        println!("\nCompleted today");
        for task in completed {
            println!(
                "    {} (+{})",
                task.title,
                timemaster_core::scoring::task_score(task)
            );
        }
    }
    println!();
}

fn print_status(engine: &GameEngine) {
    let session = engine.session();
    let timer = engine.timer();
    println!(
        "Day {} | Score {} | {} {} (cycle {}, {})",
        session.day,
        session.score,
        timer.mode().label(),
        timer.display(),
        timer.cycle(),
        engine.flow().label()
    );
    if let Some(task) = engine.active_task() {
        println!(
            "Active: {} ({}/{})",
            task.title, task.completed_pomodoros, task.estimated_pomodoros
        );
    }
    if let Some(distraction) = engine.pending_distraction() {
        println!("Distraction: {}", distraction.title);
    }
    println!(
        "Tasks {} | Pomodoros {} | Distractions {} avoided, {} yielded ({:.0}% focus)",
        session.tasks_completed,
        session.pomodoros_completed,
        session.distractions_avoided,
        session.distractions_yielded,
        session.focus_ratio() * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use timemaster_core::{FlowState, TaskStatus};

    fn engine() -> GameEngine {
        GameEngine::new(EngineOptions::default().with_seed(9))
    }

    fn run(engine: &mut GameEngine, line: &str) -> Result<Control, CoreError> {
        let command = parse_line(line).unwrap().unwrap();
        execute(engine, command)
    }

    #[test]
    fn split_keeps_quoted_text() {
        assert_eq!(
            split_words(r#"add Read "chapter five" -d "for class""#).unwrap(),
            vec!["add", "Read", "chapter five", "-d", "for class"]
        );
        assert!(split_words("").unwrap().is_empty());
        assert_eq!(
            split_words(r#"add "" -n 2"#).unwrap(),
            vec!["add", "", "-n", "2"]
        );
        assert_eq!(split_words(r#"add """#).unwrap(), vec!["add", ""]);
        assert!(split_words(r#"add "open"#).is_err());
    }

    #[test]
    fn parse_add_with_flags() {
        let cmd = parse_line("add Write essay -p q2 -n 3").unwrap().unwrap();
        assert_eq!(
            cmd,
            LineCommand::Add {
                title: vec!["Write".into(), "essay".into()],
                priority: Priority::NotUrgentImportant,
                pomodoros: 3,
                desc: None,
            }
        );
    }

    #[test]
    fn parse_add_defaults() {
        match parse_line("add Laundry").unwrap().unwrap() {
            LineCommand::Add {
                priority, pomodoros, ..
            } => {
                assert_eq!(priority, Priority::UrgentImportant);
                assert_eq!(pomodoros, 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse_line("fly").is_err());
        assert!(parse_line("add").is_err());
        assert!(parse_line("mood 6").is_err());
        assert!(parse_line("add x -p urgent").is_err());
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("end-day").unwrap(), Some(LineCommand::EndDay));
        assert_eq!(parse_line("exit").unwrap(), Some(LineCommand::Quit));
    }

    #[test]
    fn add_validates_at_the_boundary() {
        let mut e = engine();
        assert!(matches!(
            run(&mut e, "add Big -n 9"),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            run(&mut e, r#"add " ""#),
            Err(CoreError::Validation(_))
        ));
        assert!(e.tasks().is_empty());
    }

    #[test]
    fn resolve_by_number_and_prefix() {
        let mut e = engine();
        run(&mut e, "add First").unwrap();
        run(&mut e, "add Second").unwrap();
        let second = e.tasks()[1].id.clone();

        assert_eq!(resolve_task(&e, "2").unwrap(), second);
        assert_eq!(resolve_task(&e, &second).unwrap(), second);
        let short = &second["task-".len().."task-".len() + 8];
        assert_eq!(resolve_task(&e, short).unwrap(), second);
        assert!(resolve_task(&e, "0").is_err());
        assert!(resolve_task(&e, "3").is_err());
        assert!(resolve_task(&e, "zzzz").is_err());
    }

    #[test]
    fn ambiguous_prefix_is_not_found() {
        let mut e = engine();
        run(&mut e, "add First").unwrap();
        run(&mut e, "add Second").unwrap();
        assert!(matches!(
            resolve_task(&e, "task-"),
            Err(CoreError::TaskNotFound(_))
        ));
    }

    #[test]
    fn play_through_a_task() {
        let mut e = engine();
        run(&mut e, "add Study -p ui -n 2").unwrap();
        run(&mut e, "start 1").unwrap();
        assert_eq!(e.flow(), &FlowState::Running);
        run(&mut e, "skip").unwrap();
        assert_eq!(e.tasks()[0].completed_pomodoros, 1);
        run(&mut e, "complete 1").unwrap();
        assert_eq!(e.tasks()[0].status, TaskStatus::Completed);
        assert_eq!(e.session().score, 250);

        run(&mut e, "end-day").unwrap();
        assert_eq!(e.session().day, 2);
        assert!(e.tasks().is_empty());
    }

    #[test]
    fn distract_then_resolve() {
        let mut e = engine();
        assert!(matches!(run(&mut e, "ignore"), Err(CoreError::NoDistraction)));
        run(&mut e, "toggle").unwrap();
        run(&mut e, "distract").unwrap();
        assert!(e.pending_distraction().is_some());
        assert!(matches!(run(&mut e, "toggle"), Err(CoreError::DistractionPending)));
        run(&mut e, "yield").unwrap();
        assert_eq!(e.session().score, -25);
        assert_eq!(e.flow(), &FlowState::PausedManual);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut e = engine();
        assert_eq!(run(&mut e, "quit").unwrap(), Control::Quit);
        assert_eq!(run(&mut e, "mood 3").unwrap(), Control::Continue);
    }
}
