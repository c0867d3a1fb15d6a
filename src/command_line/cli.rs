#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, Parser, Subcommand};
use itertools::Itertools;
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use watchsat::sat::assignment::Solutions;
use watchsat::sat::cnf::Cnf;
use watchsat::sat::configs::{Algorithm, Polarity, SolverConfig};
use watchsat::sat::dimacs::parse_dimacs;
use watchsat::sat::literal::Literal;
use watchsat::sat::solver::{SolutionStats, Solver};

/// Defines the command-line interface for the solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "watchsat", version, about = "A backtracking SAT solver")]
pub(crate) struct Cli {
    /// Path to a DIMACS .cnf file, solved when no subcommand is given.
    /// Standard input is read when it is omitted too.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `dir`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Options used with the bare path form.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// DIMACS text, e.g. "1 -2 0\n2 3 0". Clauses end with 0.
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.cnf` file below a directory.
    Dir {
        /// Directory to walk.
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines command-line options shared across subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Search algorithm.
    #[arg(long, value_enum, default_value_t = Algorithm::Dpll)]
    pub(crate) solver: Algorithm,

    /// Run unit propagation and simplify the formula before search.
    #[arg(short = 'P', long, default_value_t = false)]
    pub(crate) preprocess: bool,

    /// Value tried first on a free decision.
    #[arg(long, value_enum, default_value_t = Polarity::Watch)]
    pub(crate) polarity: Polarity,

    /// Print the negation of the model as a DIMACS clause instead of the verdict.
    #[arg(short = 'X', long, default_value_t = false)]
    pub(crate) negate: bool,

    /// Do not print the model.
    #[arg(short, long, default_value_t = false)]
    pub(crate) quiet: bool,

    /// Check the model against the formula as it was parsed.
    #[arg(long, default_value_t = false)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Check the solver's internal consistency at every step. Slow.
    #[arg(long, default_value_t = false)]
    pub(crate) check_invariants: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

impl CommonOptions {
    pub(crate) const fn config(&self) -> SolverConfig {
        SolverConfig {
            algorithm: self.solver,
            polarity: self.polarity,
            preprocess: self.preprocess,
            check_invariants: self.check_invariants,
        }
    }

    pub(crate) const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Parses DIMACS from `reader` and solves it. `label` names the source in
/// output and errors.
///
/// # Errors
///
/// If the input cannot be parsed or a model fails verification.
pub(crate) fn solve_reader<R: BufRead>(
    reader: R,
    label: Option<&Path>,
    common: &CommonOptions,
) -> Result<Option<Solutions>, String> {
    let time = Instant::now();
    let cnf = parse_dimacs(reader).map_err(|e| match label {
        Some(path) => format!("{}: {e}", path.display()),
        None => e.to_string(),
    })?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, label, parse_time)
}

/// Parses and solves a single DIMACS file.
///
/// # Errors
///
/// If the file cannot be opened or parsed, or a model fails verification.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<Option<Solutions>, String> {
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    solve_reader(BufReader::new(file), Some(path), common)
}

/// Parses and solves DIMACS text.
///
/// # Errors
///
/// If the text cannot be parsed or a model fails verification.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<Option<Solutions>, String> {
    // Shells pass "\n" through literally.
    solve_reader(Cursor::new(input.replace("\\n", "\n")), None, common)
}

/// Solves every `.cnf` file below `path`, reporting each one.
///
/// # Errors
///
/// If `path` is not a directory, or any file fails to parse or verify.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    let (mut sat, mut unsat) = (0usize, 0usize);

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            info!("Skipping non-CNF file: {}", file_path.display());
            continue;
        }

        match solve_file(file_path, common)? {
            Some(_) => sat += 1,
            None => unsat += 1,
        }
    }

    if !common.quiet {
        println!("\n{sat} satisfiable, {unsat} unsatisfiable");
    }
    Ok(())
}

/// Checks a model against the formula it claims to satisfy.
///
/// # Errors
///
/// If some clause is not satisfied.
pub(crate) fn verify_solution(cnf: &Cnf, sol: &Solutions, quiet: bool) -> Result<(), String> {
    let ok = cnf.verify(sol);
    if !quiet {
        println!("Verified: {ok:?}");
    }
    if ok {
        Ok(())
    } else {
        Err("Solution failed verification!".to_string())
    }
}

/// Solves `cnf` under the options given and prints what they ask for.
///
/// # Errors
///
/// If verification is on and the model does not satisfy `cnf`.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<Option<Solutions>, String> {
    if let Some(name) = label {
        info!("Solving: {}", name.display());
        if !common.quiet && !common.negate {
            println!("Solving: {}", name.display());
        }
    }
    let mut solver = Solver::new(cnf.clone(), common.config());
    info!(
        "{} variables, {} clauses, {} literals, config {:?}",
        cnf.num_vars,
        cnf.num_clauses(),
        cnf.num_lits(),
        solver.config()
    );

    // A failed epoch refresh only makes the memory figures stale.
    if let Err(e) = epoch::advance() {
        warn!("jemalloc epoch: {e}");
    }
    let time = Instant::now();

    let sol = solver.solve();

    let elapsed = time.elapsed();

    if common.verify {
        if let Some(model) = &sol {
            verify_solution(cnf, model, common.quiet || common.negate)?;
        }
    }

    if common.stats && !common.quiet {
        let (allocated, resident) = memory_mib();
        print_stats(
            parse_time,
            elapsed,
            cnf,
            solver.cnf(),
            &solver.stats(),
            allocated,
            resident,
        );
    }

    for line in result_lines(cnf, sol.as_ref(), common.quiet, common.negate) {
        println!("{line}");
    }

    Ok(sol)
}

/// Allocated and resident memory in MiB, zero if jemalloc cannot say.
fn memory_mib() -> (f64, f64) {
    if let Err(e) = epoch::advance() {
        warn!("jemalloc epoch: {e}");
    }
    let read = |mib: Result<usize, tikv_jemalloc_ctl::Error>| {
        mib.map_or(0.0, |bytes| bytes as f64 / (1024.0 * 1024.0))
    };
    (read(stats::allocated::read()), read(stats::resident::read()))
}

/// The model with named variables shown by name, `~name` when false.
fn named_model(cnf: &Cnf, model: &Solutions) -> String {
    model
        .iter()
        .map(|&lit| match cnf.name(lit.variable()) {
            Some(name) if lit.polarity() => name.to_string(),
            Some(name) => format!("~{name}"),
            None => lit.to_string(),
        })
        .join(" ")
}

/// The output for a verdict.
///
/// A satisfiable verdict is followed by the model unless `quiet`. With
/// `negate` the verdict line is left out and the clause excluding the model
/// is printed instead, so the output can be appended to the formula to ask
/// for a different model.
fn result_lines(cnf: &Cnf, sol: Option<&Solutions>, quiet: bool, negate: bool) -> Vec<String> {
    match (sol, negate) {
        (Some(_), false) if quiet => vec!["SATISFIABLE".to_string()],
        (Some(model), false) => vec!["SATISFIABLE".to_string(), named_model(cnf, model)],
        (Some(_), true) if quiet => Vec::new(),
        (Some(model), true) => vec![
            "c negation of solution:".to_string(),
            model
                .blocking_clause()
                .iter()
                .map(Literal::to_string)
                .chain(std::iter::once("0".to_string()))
                .join(" "),
        ],
        (None, false) => vec!["UNSATISFIABLE".to_string()],
        (None, true) => vec!["c UNSATISFIABLE".to_string()],
    }
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    searched: &Cnf,
    s: &SolutionStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses", cnf.num_clauses());
    stat_line("Literals", cnf.num_lits());

    println!("========================[ Search Statistics ]========================");
    stat_line("Fixed by preprocessing", s.preprocessed);
    stat_line("Clauses searched", searched.num_clauses());
    stat_line_with_rate("Steps", s.steps, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Backtracks", s.backtracks, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::parse_from([
            "watchsat", "file", "f.cnf", "--solver", "watch", "-P", "-X", "-vv",
        ]);
        let Some(Commands::File { path, common }) = cli.command else {
            panic!("expected the file subcommand");
        };
        assert_eq!(path, PathBuf::from("f.cnf"));
        assert_eq!(common.solver, Algorithm::Watch);
        assert!(common.preprocess);
        assert!(common.negate);
        assert_eq!(common.log_level(), "debug");
    }

    #[test]
    fn test_bare_path_uses_defaults() {
        let cli = Cli::parse_from(["watchsat", "problem.cnf"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.path, Some(PathBuf::from("problem.cnf")));
        assert_eq!(cli.common.config(), SolverConfig::default());
        assert_eq!(cli.common.log_level(), "warn");
    }

    #[test]
    fn test_named_model() {
        let mut cnf = Cnf::new(vec![vec![1, -2]]);
        cnf.set_name(2, "wet");
        let model = Solutions::new([Literal::from(1), Literal::from(-2)]);
        assert_eq!(named_model(&cnf, &model), "1 ~wet");
    }

    #[test]
    fn test_solve_text_verdicts() {
        let common = CommonOptions {
            quiet: true,
            verify: true,
            ..CommonOptions::default()
        };
        assert!(solve_text("1 2 0\\n-1 0", &common).unwrap().is_some());
        assert!(solve_text("1 0\n-1 0", &common).unwrap().is_none());
        assert!(solve_text("1 x 0", &common).is_err());
    }

    #[test]
    fn test_solve_reader_takes_any_buffered_input() {
        let common = CommonOptions {
            quiet: true,
            ..CommonOptions::default()
        };
        let sat = solve_reader(Cursor::new("p cnf 1 1\n1 0\n"), None, &common).unwrap();
        assert_eq!(sat.map(|m| m.to_string()), Some("1".to_string()));

        let err = solve_reader(Cursor::new("1 y 0\n"), Some(Path::new("in.cnf")), &common)
            .unwrap_err();
        assert!(err.starts_with("in.cnf: line 1"), "{err}");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let common = CommonOptions::default();
        assert!(solve_file(Path::new("/nonexistent/formula.cnf"), &common).is_err());
    }

    #[test]
    fn test_result_lines_follow_quiet_and_negate() {
        let mut cnf = Cnf::new(vec![vec![1, -2]]);
        cnf.set_name(2, "wet");
        let model = Solutions::new([Literal::from(1), Literal::from(-2)]);

        assert_eq!(
            result_lines(&cnf, Some(&model), false, false),
            ["SATISFIABLE", "1 ~wet"]
        );
        assert_eq!(result_lines(&cnf, Some(&model), true, false), ["SATISFIABLE"]);
        assert_eq!(
            result_lines(&cnf, Some(&model), false, true),
            ["c negation of solution:", "-1 2 0"]
        );
        assert!(result_lines(&cnf, Some(&model), true, true).is_empty());
        assert_eq!(result_lines(&cnf, None, false, false), ["UNSATISFIABLE"]);
        assert_eq!(result_lines(&cnf, None, true, true), ["c UNSATISFIABLE"]);
    }
}
