#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver facade: optional preprocessing followed by search.

use crate::sat::assignment::Solutions;
use crate::sat::cnf::Cnf;
use crate::sat::configs::SolverConfig;
use crate::sat::preprocessing::{Preprocessed, Preprocessor, UnitPropagation};
use crate::sat::search::{Search, SearchStats, Verdict};
use crate::sat::trail::Trail;
use log::debug;

/// Counters reported after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    pub steps: usize,
    pub decisions: usize,
    pub propagations: usize,
    pub conflicts: usize,
    pub backtracks: usize,
    /// Variables fixed by preprocessing before search started.
    pub preprocessed: usize,
}

impl SolutionStats {
    const fn record(&mut self, search: SearchStats) {
        self.steps = search.steps;
        self.decisions = search.decisions;
        self.propagations = search.propagations;
        self.conflicts = search.conflicts;
        self.backtracks = search.backtracks;
    }
}

#[derive(Debug, Clone)]
pub struct Solver {
    cnf: Cnf,
    trail: Trail,
    config: SolverConfig,
    stats: SolutionStats,
    verdict: Option<Verdict>,
}

impl Solver {
    #[must_use]
    pub fn new(cnf: Cnf, config: SolverConfig) -> Self {
        let trail = Trail::new(cnf.num_vars);
        Self {
            cnf,
            trail,
            config,
            stats: SolutionStats::default(),
            verdict: None,
        }
    }

    /// Decides the formula, returning a model if it is satisfiable.
    ///
    /// Solving happens once; later calls return the same answer.
    pub fn solve(&mut self) -> Option<Solutions> {
        let verdict = match self.verdict {
            Some(verdict) => verdict,
            None => {
                let verdict = self.run();
                self.verdict = Some(verdict);
                verdict
            }
        };
        verdict.is_sat().then(|| self.solutions())
    }

    fn run(&mut self) -> Verdict {
        if self.config.preprocess {
            let outcome = UnitPropagation.preprocess(&mut self.cnf, &mut self.trail);
            self.stats.preprocessed = self.trail.len();
            match outcome {
                Preprocessed::Sat => {
                    self.trail.complete();
                    return Verdict::Sat;
                }
                Preprocessed::Unsat => {
                    self.trail = Trail::new(self.cnf.num_vars);
                    return Verdict::Unsat;
                }
                Preprocessed::Simplified => {}
            }
        }

        let mut search = match Search::new(&mut self.cnf, &mut self.trail, &self.config) {
            Ok(search) => search,
            Err(e) => {
                debug!("no search needed: {e}");
                return Verdict::Unsat;
            }
        };
        let verdict = search.run();
        self.stats.record(search.stats());
        verdict
    }

    /// The model on the trail. Only complete after a satisfiable solve.
    #[must_use]
    pub fn solutions(&self) -> Solutions {
        self.trail.solutions()
    }

    #[must_use]
    pub const fn stats(&self) -> SolutionStats {
        self.stats
    }

    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    /// The working formula, simplified if preprocessing ran.
    #[must_use]
    pub const fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::configs::{Algorithm, Polarity};
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    fn configs() -> impl Iterator<Item = SolverConfig> {
        Algorithm::ALL.into_iter().flat_map(|algorithm| {
            [false, true].into_iter().map(move |preprocess| {
                SolverConfig::new(algorithm)
                    .with_preprocessing(preprocess)
                    .with_invariant_checks(true)
            })
        })
    }

    #[derive(Debug, Clone)]
    struct SmallCnf(Vec<Vec<i32>>);

    impl Arbitrary for SmallCnf {
        fn arbitrary(g: &mut Gen) -> Self {
            let num_vars = 1 + usize::arbitrary(g) % 6;
            let num_clauses = usize::arbitrary(g) % 14;
            let clauses = (0..num_clauses)
                .map(|_| {
                    let len = 1 + usize::arbitrary(g) % 3;
                    (0..len)
                        .map(|_| {
                            #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
                            let var = (1 + usize::arbitrary(g) % num_vars) as i32;
                            if bool::arbitrary(g) { var } else { -var }
                        })
                        .collect()
                })
                .collect();
            Self(clauses)
        }

        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            Box::new(
                self.0
                    .shrink()
                    .filter(|clauses| clauses.iter().flatten().all(|&lit| lit != 0))
                    .map(Self),
            )
        }
    }

    fn brute_force(cnf: &Cnf) -> bool {
        (0u32..1 << cnf.num_vars).any(|mask| {
            cnf.iter().all(|clause| {
                clause
                    .iter()
                    .any(|lit| (mask >> (lit.variable() - 1) & 1 == 1) == lit.polarity())
            })
        })
    }

    #[quickcheck]
    fn prop_configs_agree_with_truth_table(formula: SmallCnf) -> bool {
        let cnf = Cnf::new(formula.0);
        let expected = brute_force(&cnf);

        configs().all(|config| {
            let mut solver = Solver::new(cnf.clone(), config);
            match solver.solve() {
                Some(model) => expected && model.len() == cnf.num_vars && cnf.verify(&model),
                None => !expected,
            }
        })
    }

    #[quickcheck]
    fn prop_random_polarity_is_sound(formula: SmallCnf) -> bool {
        let cnf = Cnf::new(formula.0);
        let config = SolverConfig::default().with_polarity(Polarity::Random);
        let mut solver = Solver::new(cnf.clone(), config);
        solver
            .solve()
            .map_or(!brute_force(&cnf), |model| cnf.verify(&model))
    }

    #[test]
    fn test_two_variable_unsat() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1, -2], vec![1, -2], vec![-1, 2]]);
        for config in configs() {
            let mut solver = Solver::new(cnf.clone(), config);
            assert_eq!(solver.solve(), None, "{config:?}");
            assert!(solver.trail().is_empty(), "{config:?}");
        }
    }

    #[test]
    fn test_contradiction_caught_by_preprocessing() {
        let cnf = Cnf::new(vec![vec![1], vec![-1]]);
        let config = SolverConfig::default().with_preprocessing(true);
        let mut solver = Solver::new(cnf, config);
        assert_eq!(solver.solve(), None);
        assert_eq!(solver.stats().steps, 0);
        assert_eq!(solver.stats().preprocessed, 1);
    }

    #[test]
    fn test_preprocessing_leaves_simplified_formula() {
        let cnf = Cnf::new(vec![vec![1], vec![-1, 2, 3], vec![-2, 3, 4], vec![2, -4]]);
        let config = SolverConfig::new(Algorithm::Active).with_preprocessing(true);
        let mut solver = Solver::new(cnf.clone(), config);
        let model = solver.solve().unwrap();

        assert!(cnf.verify(&model));
        assert!(solver.config().preprocess);
        assert_eq!(solver.stats().preprocessed, 1);
        assert_eq!(solver.cnf().num_clauses(), 3);
        assert!(solver.cnf().iter().flatten().all(|lit| lit.variable() != 1));
    }

    #[test]
    fn test_single_clause_sat() {
        let cnf = Cnf::new(vec![vec![1, 2, 3]]);
        for config in configs() {
            let mut solver = Solver::new(cnf.clone(), config);
            let model = solver.solve().unwrap();
            assert_eq!(solver.trail().len(), 3, "{config:?}");
            assert!(cnf.verify(&model), "{config:?}");
        }
    }

    #[test]
    fn test_empty_clause_takes_no_steps() {
        let cnf = Cnf::new(vec![vec![1, -2], vec![], vec![2]]);
        for config in configs() {
            let mut solver = Solver::new(cnf.clone(), config);
            assert_eq!(solver.solve(), None, "{config:?}");
            assert_eq!(solver.stats(), SolutionStats::default(), "{config:?}");
        }
    }

    #[test]
    fn test_solve_is_cached() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1]]);
        let mut solver = Solver::new(cnf, SolverConfig::new(Algorithm::Watch));
        let first = solver.solve();
        let stats = solver.stats();
        assert_eq!(solver.solve(), first);
        assert_eq!(solver.stats(), stats);
        assert_eq!(first.map(|m| m.to_string()), Some("-1 2".to_string()));
    }

    #[test]
    fn test_empty_formula_is_sat() {
        let mut solver = Solver::new(Cnf::default(), SolverConfig::default());
        assert_eq!(solver.solve().map(|m| m.len()), Some(0));
    }
}
