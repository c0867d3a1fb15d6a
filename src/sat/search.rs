#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The backtracking search driver.
//!
//! One loop covers all four [`Algorithm`]s. Each step picks a variable,
//! assigns it and propagates the literal that became false. A conflict
//! backtracks to the latest decision with an untried value, flips it and
//! propagates again, until either propagation succeeds or the trail runs out.
//!
//! | algorithm | decision variable             | conflict detection |
//! |-----------|-------------------------------|--------------------|
//! | `Naive`   | lowest unassigned             | full re-scan       |
//! | `Watch`   | lowest unassigned             | watch repair       |
//! | `Active`  | head of the active set        | watch repair       |
//! | `Dpll`    | unit clause, else active head | watch repair       |

use crate::sat::active::ActiveSet;
use crate::sat::cnf::Cnf;
use crate::sat::configs::{Algorithm, Polarity, SolverConfig};
use crate::sat::literal::{Literal, Variable};
use crate::sat::propagation::{next_unit_clause, repair, rescan, Conflict};
use crate::sat::sanity;
use crate::sat::trail::Trail;
use crate::sat::watch::{EmptyClause, WatchLists};
use log::{debug, info, trace};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Sat,
    Unsat,
}

impl Verdict {
    #[must_use]
    pub const fn is_sat(self) -> bool {
        matches!(self, Self::Sat)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sat => write!(f, "SATISFIABLE"),
            Self::Unsat => write!(f, "UNSATISFIABLE"),
        }
    }
}

/// Counters collected over one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Loop iterations, one per decision or forced assignment attempt.
    pub steps: usize,
    pub decisions: usize,
    /// Assignments made by unit clauses.
    pub propagations: usize,
    pub conflicts: usize,
    /// Decisions flipped to their second value.
    pub backtracks: usize,
}

#[derive(Debug)]
pub struct Search<'a> {
    cnf: &'a mut Cnf,
    trail: &'a mut Trail,
    watches: Option<WatchLists>,
    active: Option<ActiveSet>,
    algorithm: Algorithm,
    polarity: Polarity,
    check_invariants: bool,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    /// Prepares a search over `cnf`, continuing from whatever `trail` holds.
    ///
    /// Variables already on the trail must not occur in `cnf`; this is what
    /// preprocessing leaves behind.
    ///
    /// # Errors
    ///
    /// If `cnf` contains an empty clause, before any step is taken.
    pub fn new(
        cnf: &'a mut Cnf,
        trail: &'a mut Trail,
        config: &SolverConfig,
    ) -> Result<Self, EmptyClause> {
        let algorithm = config.algorithm;

        let watches = if algorithm.use_watch_lists() {
            Some(WatchLists::new(cnf)?)
        } else if let Some(clause) = cnf.empty_clause() {
            return Err(EmptyClause { clause });
        } else {
            None
        };

        let active = watches
            .as_ref()
            .filter(|_| algorithm.use_active_list())
            .map(|watches| ActiveSet::new(cnf.num_vars, watches));

        Ok(Self {
            cnf,
            trail,
            watches,
            active,
            algorithm,
            polarity: config.polarity,
            check_invariants: config.check_invariants,
            stats: SearchStats::default(),
        })
    }

    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Runs the search to a verdict.
    ///
    /// On `Sat` the trail holds every variable. On `Unsat` it is empty.
    ///
    /// # Panics
    ///
    /// With invariant checking enabled, on the first inconsistency between
    /// the trail, the watch lists and the active set.
    pub fn run(&mut self) -> Verdict {
        let verdict = self.search();
        info!(
            "{} search: {verdict} after {} steps, {} decisions, {} propagations, {} conflicts",
            self.algorithm,
            self.stats.steps,
            self.stats.decisions,
            self.stats.propagations,
            self.stats.conflicts
        );
        verdict
    }

    fn search(&mut self) -> Verdict {
        loop {
            if self.trail.is_complete() {
                return Verdict::Sat;
            }

            self.stats.steps += 1;
            if self.check_invariants {
                self.assert_consistent();
            }

            let Some(mut falsified) = self.assign_next() else {
                // Every clause is watched by a true literal.
                debug!("active set empty with {} variables assigned", self.trail.len());
                self.trail.complete();
                return Verdict::Sat;
            };

            while let Err(conflict) = self.propagate(falsified) {
                self.stats.conflicts += 1;
                trace!("conflict on {falsified}: {conflict}");
                match self.backtrack() {
                    Some(lit) => falsified = lit,
                    None => return Verdict::Unsat,
                }
            }
        }
    }

    /// Makes the next assignment and returns the literal it falsified, or
    /// `None` when the active set has run dry.
    fn assign_next(&mut self) -> Option<Literal> {
        if self.active.is_none() {
            let var = self.trail.first_unassigned()?;
            return Some(self.decide(var));
        }

        if self.algorithm.use_propagation() {
            if let (Some(watches), Some(active)) = (&self.watches, self.active.as_mut()) {
                if let Some(lit) = next_unit_clause(self.cnf, self.trail, watches, active) {
                    let popped = active.pop();
                    debug_assert_eq!(popped, Some(lit.variable()));
                    self.stats.propagations += 1;
                    trace!("unit {lit}");
                    return Some(self.trail.force(lit));
                }
            }
        }

        let var = self.active.as_mut()?.pop()?;
        Some(self.decide(var))
    }

    fn decide(&mut self, var: Variable) -> Literal {
        let value = self.choose_value(var);
        self.stats.decisions += 1;
        trace!("decide {} at depth {}", Literal::new(var, value), self.trail.len());
        self.trail.decide(var, value)
    }

    fn choose_value(&self, var: Variable) -> bool {
        match self.polarity {
            Polarity::True => true,
            Polarity::False => false,
            Polarity::Random => fastrand::bool(),
            Polarity::Watch => self.watches.as_ref().is_none_or(|watches| {
                watches.is_empty(Literal::new(var, false)) || !watches.is_empty(Literal::new(var, true))
            }),
        }
    }

    fn propagate(&mut self, lit: Literal) -> Result<(), Conflict> {
        match self.watches.as_mut() {
            Some(watches) => repair(self.cnf, self.trail, watches, self.active.as_mut(), lit),
            None => rescan(self.cnf, self.trail),
        }
    }

    fn backtrack(&mut self) -> Option<Literal> {
        let watches = self.watches.as_ref();
        let mut active = self.active.as_mut();

        let flipped = self.trail.backtrack(|var| {
            if let (Some(watches), Some(active)) = (watches, active.as_deref_mut()) {
                if watches.is_watched(var) {
                    active.push(var);
                }
            }
        });

        match flipped {
            Some(lit) => {
                self.stats.backtracks += 1;
                debug!(
                    "backtrack to depth {}, now trying {}",
                    self.trail.len(),
                    lit.negated()
                );
            }
            None => debug!("search space exhausted"),
        }
        flipped
    }

    fn assert_consistent(&self) {
        let (cnf, trail) = (&*self.cnf, &*self.trail);
        let mut result = sanity::check_trail(trail);
        if let Some(watches) = &self.watches {
            result = result.and_then(|()| sanity::check_watch_lists(cnf, trail, watches));
            if let Some(active) = &self.active {
                result = result.and_then(|()| sanity::check_active_set(trail, watches, active));
            }
        }
        if let Err(violation) = result {
            panic!("inconsistent state at step {}: {violation}", self.stats.steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(clauses: Vec<Vec<i32>>, algorithm: Algorithm) -> (Verdict, SearchStats, Trail) {
        let mut cnf = Cnf::new(clauses);
        let mut trail = Trail::new(cnf.num_vars);
        let config = SolverConfig::new(algorithm).with_invariant_checks(true);
        let (verdict, stats) = match Search::new(&mut cnf, &mut trail, &config) {
            Ok(mut search) => (search.run(), search.stats()),
            Err(_) => (Verdict::Unsat, SearchStats::default()),
        };
        (verdict, stats, trail)
    }

    #[test]
    fn test_two_variable_unsat_everywhere() {
        let clauses = vec![vec![1, 2], vec![-1, -2], vec![1, -2], vec![-1, 2]];
        for algorithm in Algorithm::ALL {
            let (verdict, stats, trail) = run(clauses.clone(), algorithm);
            assert_eq!(verdict, Verdict::Unsat, "{algorithm}");
            assert!(stats.conflicts > 0, "{algorithm}");
            assert!(trail.is_empty(), "{algorithm}");
        }
    }

    #[test]
    fn test_single_clause_sat_everywhere() {
        for algorithm in Algorithm::ALL {
            let (verdict, _, trail) = run(vec![vec![1, 2, 3]], algorithm);
            assert_eq!(verdict, Verdict::Sat, "{algorithm}");
            assert_eq!(trail.len(), 3, "{algorithm}");
            assert!(
                [1, 2, 3].iter().any(|&v| trail.value(v) == Some(true)),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn test_empty_clause_rejected_before_search() {
        for algorithm in Algorithm::ALL {
            let mut cnf = Cnf::new(vec![vec![1, 2], vec![]]);
            let mut trail = Trail::new(cnf.num_vars);
            let result = Search::new(&mut cnf, &mut trail, &SolverConfig::new(algorithm));
            assert_eq!(result.err(), Some(EmptyClause { clause: 1 }), "{algorithm}");
        }
    }

    #[test]
    fn test_active_stops_when_nothing_is_watched() {
        let (verdict, stats, trail) = run(vec![vec![1, 2]], Algorithm::Active);
        assert_eq!(verdict, Verdict::Sat);
        assert_eq!(stats.decisions, 1);
        assert_eq!(stats.steps, 2);
        assert_eq!(trail.solutions().to_string(), "1 2");
    }

    #[test]
    fn test_dpll_forces_unit_chain() {
        let (verdict, stats, trail) = run(vec![vec![1], vec![-1, 2]], Algorithm::Dpll);
        assert_eq!(verdict, Verdict::Sat);
        assert_eq!(stats.decisions, 0);
        assert_eq!(stats.propagations, 2);
        assert_eq!(trail.forced_prefix(), 2);
    }

    #[test]
    fn test_naive_enumerates_in_order() {
        // Needs 1 = false, found after flipping the first decision.
        let (verdict, stats, trail) = run(vec![vec![-1], vec![2]], Algorithm::Naive);
        assert_eq!(verdict, Verdict::Sat);
        assert_eq!(stats.backtracks, 1);
        assert_eq!(trail.solutions().to_string(), "-1 2");
    }

    #[test]
    fn test_fixed_polarity() {
        let mut cnf = Cnf::new(vec![vec![1, 2]]);
        let mut trail = Trail::new(cnf.num_vars);
        let config = SolverConfig::new(Algorithm::Watch).with_polarity(Polarity::False);
        let mut search = Search::new(&mut cnf, &mut trail, &config).unwrap();
        assert_eq!(search.run(), Verdict::Sat);
        assert_eq!(search.stats().decisions, 2);
        assert_eq!(trail.solutions().to_string(), "-1 2");
    }
}
