//! Line-oriented interactive play.

use std::{
    io::{self, BufRead as _, Write as _},
    path::PathBuf,
};

use hueflip_core::Position;
use hueflip_game::{JsonFileStore, Outcome, Phase, Session};

use crate::{CliError, print_board};

const HELP: &str = "\
commands:
  <row>-<col>   click a tile (also: c <row>-<col>)
  u             undo
  r             reset the level
  h             hint
  t [n]         let n seconds pass (default 1)
  p             pause or resume
  n             next level
  a             start the level again with a new puzzle
  s             show the board
  q             save and quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Click(Position),
    Undo,
    Reset,
    Hint,
    Tick(u32),
    Pause,
    Next,
    Again,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    let command = match first {
        "c" | "click" => Command::Click(words.next()?.parse().ok()?),
        "u" | "undo" => Command::Undo,
        "r" | "reset" => Command::Reset,
        "h" | "hint" => Command::Hint,
        "t" | "tick" => Command::Tick(match words.next() {
            Some(n) => n.parse().ok()?,
            None => 1,
        }),
        "p" | "pause" => Command::Pause,
        "n" | "next" => Command::Next,
        "a" | "again" => Command::Again,
        "s" | "show" => Command::Show,
        "?" | "help" => Command::Help,
        "q" | "quit" => Command::Quit,
        pos => Command::Click(pos.parse().ok()?),
    };
    words.next().is_none().then_some(command)
}

pub fn run(save: PathBuf) -> Result<(), CliError> {
    let mut session = Session::new(Box::new(JsonFileStore::new(save)));
    if !session.continue_saved()? {
        session.start_level(1)?;
    }
    show(&session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            println!("unknown command, type `help` for a list");
            continue;
        };
        match command {
            Command::Click(pos) => {
                let outcome = session.click(pos);
                report(&outcome);
                show(&session);
            }
            Command::Undo => report(&session.undo()),
            Command::Reset => report(&session.reset()),
            Command::Hint => match session.hint() {
                Some(pos) => println!("try {pos}"),
                None => println!("no hint available"),
            },
            Command::Tick(seconds) => {
                for _ in 0..seconds {
                    let outcome = session.tick();
                    if outcome != Outcome::Applied {
                        report(&outcome);
                        break;
                    }
                }
            }
            Command::Pause => report(&session.pause()),
            Command::Next => {
                session.next_level()?;
                show(&session);
            }
            Command::Again => {
                session.start_level(session.state().level())?;
                show(&session);
            }
            Command::Show => show(&session),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    if !matches!(session.state().phase(), Phase::Idle) {
        session.save();
    }
    Ok(())
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Applied => {}
        Outcome::Ignored(reason) => println!("ignored: {reason}"),
        Outcome::Solved => println!("solved!"),
        Outcome::TimeExpired => println!("time is up, type `a` to try again"),
        Outcome::Scored(breakdown) => println!(
            "solved! {} points (base {}, moves {}, time {}, perfect {})",
            breakdown.total_points,
            breakdown.base_points,
            breakdown.move_bonus,
            breakdown.time_bonus,
            breakdown.perfect_bonus
        ),
    }
}

fn show(session: &Session) {
    let state = session.state();
    println!(
        "level {} | moves {}{} | time {}s{} | points {}",
        state.level(),
        state.moves(),
        state
            .move_limit()
            .map(|limit| format!("/{limit}"))
            .unwrap_or_default(),
        state.time(),
        bonus_target(session.constraints().and_then(|c| c.time_bonus), state.time()),
        state.total_points()
    );
    if let Some(message) = session
        .constraints()
        .and_then(|c| c.tutorial_message.as_deref())
        && state.moves() == 0
    {
        println!("{message}");
    }
    if let Some(board) = state.board() {
        print_board(board);
    }
}

fn bonus_target(target: Option<u32>, time: u32) -> String {
    match target {
        Some(target) if time <= target => format!(" (bonus target {target}s)"),
        Some(_) => " (bonus target missed)".to_owned(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("1-2"),
            Some(Command::Click(Position::new(1, 2)))
        );
        assert_eq!(
            parse_command("c 0-0"),
            Some(Command::Click(Position::new(0, 0)))
        );
        assert_eq!(parse_command("t"), Some(Command::Tick(1)));
        assert_eq!(parse_command("tick 15"), Some(Command::Tick(15)));
        assert_eq!(parse_command(" q "), Some(Command::Quit));
        assert_eq!(parse_command("c"), None);
        assert_eq!(parse_command("u now"), None);
        assert_eq!(parse_command("jump"), None);
    }

    #[test]
    fn test_bonus_target() {
        assert_eq!(bonus_target(None, 10), "");
        assert_eq!(bonus_target(Some(40), 40), " (bonus target 40s)");
        assert_eq!(bonus_target(Some(40), 41), " (bonus target missed)");
    }
}
