//! # watchsat
//!
//! A command-line SAT solver for formulas in DIMACS CNF format.
//!
//! The search engine is a chronological backtracking loop with four
//! configurations, selected with `--solver`:
//!
//! 1.  **`naive`**: enumerates variables in order and re-scans every clause
//!     after each assignment.
//! 2.  **`watch`**: the same enumeration, with conflicts found through watch
//!     lists (one watched literal per clause).
//! 3.  **`active`**: decisions drawn from the active variable set, and the
//!     search stops as soon as no unassigned variable watches a clause.
//! 4.  **`dpll`**: the active set plus unit propagation.
//!
//! ## Usage
//!
//! ```sh
//! watchsat [OPTIONS] [PATH]
//! watchsat [OPTIONS] < problem.cnf
//! watchsat file <PATH> [OPTIONS]
//! watchsat text --input "1 -2 0\n2 3 0" [OPTIONS]
//! watchsat dir <DIRECTORY> [OPTIONS]
//! watchsat completions <SHELL>
//! ```
//!
//! ### Options
//!
//! -   `--solver <naive|watch|active|dpll>`: search algorithm (default: `dpll`).
//! -   `-P, --preprocess`: unit propagation and simplification before search.
//! -   `--polarity <watch|true|false|random>`: value of free decisions.
//! -   `-X, --negate`: print the clause excluding the model found, after a
//!     `c negation of solution:` line, instead of the verdict.
//! -   `-q, --quiet`: print the verdict but not the model.
//! -   `--verify`: check the model against the input formula.
//! -   `--stats`: print problem, search and memory statistics.
//! -   `--check-invariants`: verify internal consistency at every step.
//! -   `-v`: more logging, repeatable. `RUST_LOG` overrides it.
//!
//! A model is printed after `SATISFIABLE` as signed variables, with named
//! variables from `c NAME -> IDX` comments shown as `name` or `~name`.
//!
//! ## Exit status
//!
//! `0` if the formula is satisfiable, `1` if it is not, `2` on bad input.
//! The `dir` subcommand exits `0` once every file has been solved.

mod command_line;

use crate::command_line::cli::{
    Cli, Commands, CommonOptions, solve_dir, solve_file, solve_reader, solve_text,
};
use clap::{CommandFactory, Parser};
use log::info;
use std::process::ExitCode;
use watchsat::sat::assignment::Solutions;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(common: &CommonOptions) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(common.log_level()))
        .init();
}

fn exit_code(result: Result<Option<Solutions>, String>) -> ExitCode {
    match result {
        Ok(Some(_)) => ExitCode::SUCCESS,
        Ok(None) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::File { path, common }) => {
            init_logging(&common);
            exit_code(solve_file(&path, &common))
        }
        Some(Commands::Text { input, common }) => {
            init_logging(&common);
            exit_code(solve_text(&input, &common))
        }
        Some(Commands::Dir { path, common }) => {
            init_logging(&common);
            match solve_dir(&path, &common) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::from(2)
                }
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::SUCCESS
        }
        None => match cli.path {
            Some(path) => {
                init_logging(&cli.common);
                exit_code(solve_file(&path, &cli.common))
            }
            None => {
                init_logging(&cli.common);
                info!("Reading DIMACS from standard input");
                exit_code(solve_reader(std::io::stdin().lock(), None, &cli.common))
            }
        },
    }
}
