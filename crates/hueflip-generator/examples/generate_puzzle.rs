//! Example demonstrating Hueflip puzzle generation.
//!
//! This example shows how to:
//! - Create a `PuzzleGenerator`
//! - Generate a puzzle for a level, randomly or from a seed
//! - Display the puzzle, its optimal path, and its seed
//! - Sample many puzzles in parallel and keep the most scattered one
//!
//! # Usage
//!
//! ```sh
//! cargo run --example generate_puzzle -- --level 20
//! ```
//!
//! Reproduce a puzzle from its seed:
//!
//! ```sh
//! cargo run --example generate_puzzle -- --level 20 --seed c1d44bd6afaf8af64f126546884e19298acbdc33c3924a28136715de946ef3f1
//! ```
//!
//! Sample puzzles and keep the one whose solution touches the most distinct
//! tiles:
//!
//! ```sh
//! cargo run --example generate_puzzle -- --level 60 --max-tries 1000
//! ```

use std::{collections::HashSet, process};

use clap::Parser;
use hueflip_generator::{GeneratedPuzzle, PuzzleGenerator, PuzzleSeed};
use rayon::prelude::*;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Level to generate.
    #[arg(short, long, default_value_t = 1)]
    level: u32,

    /// Seed to generate from (64 hex digits).
    #[arg(long, value_name = "SEED", conflicts_with = "max_tries")]
    seed: Option<PuzzleSeed>,

    /// Number of puzzles to sample, keeping the most scattered one.
    #[arg(long, value_name = "COUNT")]
    max_tries: Option<usize>,
}

fn main() {
    let args = Args::parse();
    let generator = PuzzleGenerator::new();

    if let Some(max_tries) = args.max_tries {
        if max_tries == 0 {
            eprintln!("--max-tries must be at least 1.");
            process::exit(1);
        }
        let best = (0..max_tries)
            .into_par_iter()
            .filter_map(|_| generator.generate(args.level).ok())
            .max_by_key(distinct_tiles);
        let Some(puzzle) = best else {
            eprintln!("No puzzle could be generated for level {}.", args.level);
            process::exit(1);
        };
        print_puzzle(&puzzle, Some(max_tries));
        return;
    }

    let seed = args.seed.unwrap_or_else(PuzzleSeed::random);
    match generator.generate_with_seed(args.level, seed) {
        Ok(puzzle) => print_puzzle(&puzzle, None),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

fn distinct_tiles(puzzle: &GeneratedPuzzle) -> usize {
    puzzle.optimal_path.iter().collect::<HashSet<_>>().len()
}

fn print_puzzle(puzzle: &GeneratedPuzzle, max_tries: Option<usize>) {
    println!("Seed:");
    println!("  {}", puzzle.seed);
    println!();

    if let Some(max_tries) = max_tries {
        println!("Selection:");
        println!("  Max tries: {max_tries}");
        println!("  Distinct tiles: {}", distinct_tiles(puzzle));
        println!();
    }

    let profile = &puzzle.profile;
    println!("Level {} ({}):", profile.level, puzzle.source);
    println!(
        "  {}x{}, {} colors, {} moves",
        profile.grid_size, profile.grid_size, profile.color_count, profile.required_moves
    );
    println!();
    println!("Grid:");
    for line in puzzle.grid.to_string().lines() {
        println!("  {line}");
    }
    println!();
    println!("Optimal path:");
    let path = puzzle
        .optimal_path
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    println!("  {}", path.join(" "));
}
