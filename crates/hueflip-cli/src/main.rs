//! Command-line front end for the Hueflip puzzle engine.
//!
//! # Usage
//!
//! ```sh
//! hueflip generate --level 20
//! hueflip solve --level 20 --seed <SEED>
//! hueflip simulate --from 1 --to 50
//! hueflip verify --to 300 --seeds 4
//! hueflip play --save hueflip-save.json
//! ```

use std::{fs, io, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use hueflip_core::{Board, Position};
use hueflip_game::{MemoryStore, Outcome, Session, SessionError, StoreError};
use hueflip_generator::{GenerateError, GeneratedPuzzle, PuzzleGenerator, PuzzleSeed};
use hueflip_solver::{BfsSolver, LinearOracle, OracleError, SolvabilityOracle as _};
use rayon::prelude::*;

mod play;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a puzzle and print it.
    Generate {
        /// Level to generate.
        #[arg(short, long, default_value_t = 1)]
        level: u32,
        /// Seed to generate from (64 hex digits).
        #[arg(long, value_name = "SEED")]
        seed: Option<PuzzleSeed>,
        /// Print the puzzle as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Search a shortest solution and check solvability.
    Solve {
        /// Level to generate.
        #[arg(short, long, default_value_t = 1, conflicts_with = "board")]
        level: u32,
        /// Seed to generate from (64 hex digits).
        #[arg(long, value_name = "SEED", conflicts_with = "board")]
        seed: Option<PuzzleSeed>,
        /// Board to solve, as JSON.
        #[arg(long, value_name = "FILE")]
        board: Option<PathBuf>,
    },
    /// Play a range of levels along their generated solutions.
    Simulate {
        /// First level.
        #[arg(long, default_value_t = 1)]
        from: u32,
        /// Last level.
        #[arg(long, default_value_t = 20)]
        to: u32,
        /// Seed the level seeds are derived from.
        #[arg(long, value_name = "SEED")]
        seed: Option<PuzzleSeed>,
    },
    /// Generate many puzzles in parallel and check every one of them.
    Verify {
        /// First level.
        #[arg(long, default_value_t = 1)]
        from: u32,
        /// Last level.
        #[arg(long, default_value_t = 200)]
        to: u32,
        /// Puzzles per level.
        #[arg(long, default_value_t = 3)]
        seeds: u32,
    },
    /// Play interactively, saving progress to a file.
    Play {
        /// Save file.
        #[arg(long, value_name = "FILE", default_value = "hueflip-save.json")]
        save: PathBuf,
    },
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
enum CliError {
    #[display("{_0}")]
    Generate(#[from] GenerateError),
    #[display("{_0}")]
    Session(#[from] SessionError),
    #[display("{_0}")]
    Store(#[from] StoreError),
    #[display("{_0}")]
    Oracle(#[from] OracleError),
    #[display("I/O error: {_0}")]
    Io(#[from] io::Error),
    #[display("invalid board: {_0}")]
    Json(#[from] serde_json::Error),
    #[display("{failed} of {checked} puzzles failed verification")]
    #[from(ignore)]
    VerificationFailed { failed: usize, checked: usize },
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::VerificationFailed { .. } => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

fn main() -> ExitCode {
    better_panic::install();
    env_logger::init();

    let args = Args::parse();
    let result = match args.command {
        Command::Generate { level, seed, json } => generate(level, seed, json),
        Command::Solve { level, seed, board } => solve(level, seed, board),
        Command::Simulate { from, to, seed } => simulate(from, to, seed),
        Command::Verify { from, to, seeds } => verify(from, to, seeds),
        Command::Play { save } => play::run(save),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn generate(level: u32, seed: Option<PuzzleSeed>, json: bool) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(PuzzleSeed::random);
    let puzzle = PuzzleGenerator::new().generate_with_seed(level, seed)?;
    if json {
        let value = serde_json::json!({
            "level": puzzle.level(),
            "seed": puzzle.seed.to_string(),
            "source": puzzle.source.to_string(),
            "board": puzzle.board(),
            "optimalPath": puzzle.optimal_path,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_puzzle(&puzzle);
    }
    Ok(())
}

fn print_puzzle(puzzle: &GeneratedPuzzle) {
    let profile = &puzzle.profile;
    println!("Seed:");
    println!("  {}", puzzle.seed);
    println!();
    println!("Level {} ({}):", profile.level, puzzle.source);
    println!(
        "  {}x{}, {} colors, {} moves",
        profile.grid_size,
        profile.grid_size,
        puzzle.color_count,
        puzzle.optimal_path.len()
    );
    println!();
    print_board(&puzzle.board());
    println!();
    println!("Optimal path:");
    println!("  {}", format_path(&puzzle.optimal_path));
}

fn print_board(board: &Board) {
    println!("Grid:");
    for line in board.grid().to_string().lines() {
        println!("  {line}");
    }
    if !board.power().is_empty() {
        println!("Power tiles: {}", format_path(board.power().iter()));
    }
    if !board.locked().is_empty() {
        let locked = board
            .locked()
            .iter()
            .map(|(pos, count)| format!("{pos}:{count}"))
            .collect::<Vec<_>>();
        println!("Locked tiles: {}", locked.join(" "));
    }
}

fn format_path<'a>(path: impl IntoIterator<Item = &'a Position>) -> String {
    path.into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn solve(level: u32, seed: Option<PuzzleSeed>, board: Option<PathBuf>) -> Result<(), CliError> {
    let board = if let Some(path) = board {
        let json = fs::read_to_string(path)?;
        serde_json::from_str::<Board>(&json)?
    } else {
        let seed = seed.unwrap_or_else(PuzzleSeed::random);
        let puzzle = PuzzleGenerator::new().generate_with_seed(level, seed)?;
        println!("Seed:");
        println!("  {}", puzzle.seed);
        println!();
        puzzle.board()
    };
    print_board(&board);
    println!();

    let solvable = LinearOracle::new().is_solvable(&board)?;
    println!("Solvable: {}", if solvable { "yes" } else { "no" });

    let outcome = BfsSolver::new().solve(&board);
    if outcome.found() || board.is_solved() {
        println!(
            "Shortest solution ({} moves, {} states):",
            outcome.solution.len(),
            outcome.explored
        );
        println!("  {}", format_path(&outcome.solution));
    } else if outcome.exhausted {
        println!(
            "Search gave up after {} states without a solution.",
            outcome.explored
        );
    } else {
        println!("No solution exists ({} states explored).", outcome.explored);
    }
    Ok(())
}

fn simulate(from: u32, to: u32, seed: Option<PuzzleSeed>) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(PuzzleSeed::random);
    let mut session = Session::new(Box::new(MemoryStore::new()));
    println!("Seed: {seed}");
    for level in from.max(1)..=to {
        session.start_level_with_seed(level, seed.for_attempt(level))?;
        let path = session.state().optimal_path().to_vec();
        let mut last = Outcome::Applied;
        for pos in path {
            last = session.click(pos);
        }
        match last {
            Outcome::Scored(breakdown) => println!(
                "level {level:>4}: {:>2} moves, {:>5} points",
                session.state().moves(),
                breakdown.total_points
            ),
            outcome => println!("level {level:>4}: not solved ({outcome:?})"),
        }
    }
    println!("Total points: {}", session.state().total_points());
    Ok(())
}

#[derive(Debug)]
struct Check {
    level: u32,
    seed: PuzzleSeed,
    problem: Option<String>,
}

fn verify(from: u32, to: u32, seeds: u32) -> Result<(), CliError> {
    let jobs = (from.max(1)..=to)
        .flat_map(|level| (0..seeds).map(move |i| (level, i)))
        .collect::<Vec<_>>();
    let base = PuzzleSeed::random();

    let checks = jobs
        .par_iter()
        .map_init(
            || (PuzzleGenerator::new(), LinearOracle::new()),
            |(generator, oracle), &(level, i)| {
                let seed = base.for_attempt(level.wrapping_mul(1000).wrapping_add(i));
                check_puzzle(generator, oracle, level, seed)
            },
        )
        .collect::<Vec<_>>();

    let failures = checks
        .iter()
        .filter(|check| check.problem.is_some())
        .collect::<Vec<_>>();
    for check in &failures {
        eprintln!(
            "level {} seed {}: {}",
            check.level,
            check.seed,
            check.problem.as_deref().unwrap_or_default()
        );
    }
    println!("Checked {} puzzles, {} failed.", checks.len(), failures.len());
    if failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::VerificationFailed {
            failed: failures.len(),
            checked: checks.len(),
        })
    }
}

fn check_puzzle(
    generator: &PuzzleGenerator,
    oracle: &LinearOracle,
    level: u32,
    seed: PuzzleSeed,
) -> Check {
    let problem = match generator.generate_with_seed(level, seed) {
        Err(err) => Some(err.to_string()),
        Ok(puzzle) if !puzzle.verify_solution() => {
            Some("optimal path does not solve the puzzle".to_owned())
        }
        Ok(puzzle) if puzzle.board().is_solved() => Some("puzzle is already solved".to_owned()),
        Ok(puzzle) => match oracle.is_solvable(&puzzle.board()) {
            Ok(true) => None,
            Ok(false) => Some("oracle reports the puzzle as unsolvable".to_owned()),
            Err(err) => {
                log::warn!("level {level}: {err}");
                None
            }
        },
    };
    Check {
        level,
        seed,
        problem,
    }
}
