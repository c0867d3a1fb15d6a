#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Formula simplification before search.
//!
//! A preprocessor may assign variables on the trail and rewrite the formula,
//! as long as the rewritten formula together with those assignments is
//! equisatisfiable with the original.

use crate::sat::active::ActiveSet;
use crate::sat::cnf::Cnf;
use crate::sat::propagation::{next_unit_clause, repair};
use crate::sat::trail::Trail;
use crate::sat::watch::WatchLists;
use log::{debug, info};

/// Outcome of a preprocessing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preprocessed {
    /// The assignments made so far satisfy every clause.
    Sat,
    /// A clause was falsified or empty.
    Unsat,
    /// No verdict; the formula was rewritten and search should continue.
    Simplified,
}

pub trait Preprocessor {
    fn preprocess(&self, cnf: &mut Cnf, trail: &mut Trail) -> Preprocessed;
}

/// Forces unit clauses until none is left, then drops satisfied clauses and
/// false literals from the formula.
///
/// Forced variables stay on the trail as `Forced` and no longer occur in the
/// simplified formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitPropagation;

impl Preprocessor for UnitPropagation {
    fn preprocess(&self, cnf: &mut Cnf, trail: &mut Trail) -> Preprocessed {
        let mut watches = match WatchLists::new(cnf) {
            Ok(watches) => watches,
            Err(e) => {
                debug!("preprocessing: {e}");
                return Preprocessed::Unsat;
            }
        };
        let mut active = ActiveSet::new(cnf.num_vars, &watches);
        let before = trail.len();

        while !active.is_empty() {
            let Some(lit) = next_unit_clause(cnf, trail, &watches, &mut active) else {
                cnf.simplify(trail);
                info!(
                    "preprocessing forced {} variables, {} clauses remain",
                    trail.len() - before,
                    cnf.num_clauses()
                );
                return Preprocessed::Simplified;
            };

            active.pop();
            let falsified = trail.force(lit);
            if let Err(conflict) = repair(cnf, trail, &mut watches, Some(&mut active), falsified) {
                debug!("preprocessing: forcing {lit} falsified {conflict}");
                return Preprocessed::Unsat;
            }
        }

        info!("preprocessing satisfied the formula with {} forced variables", trail.len() - before);
        Preprocessed::Sat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::VarState;

    fn preprocess(cnf: &mut Cnf, trail: &mut Trail) -> Preprocessed {
        UnitPropagation.preprocess(cnf, trail)
    }

    #[test]
    fn test_contradicting_units() {
        let mut cnf = Cnf::new(vec![vec![1], vec![-1]]);
        let mut trail = Trail::new(cnf.num_vars);
        assert_eq!(preprocess(&mut cnf, &mut trail), Preprocessed::Unsat);
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn test_empty_clause() {
        let mut cnf = Cnf::new(vec![vec![1, 2], vec![]]);
        let mut trail = Trail::new(cnf.num_vars);
        assert_eq!(preprocess(&mut cnf, &mut trail), Preprocessed::Unsat);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_units_satisfy_everything() {
        let mut cnf = Cnf::new(vec![vec![1], vec![1, 2], vec![-1, 3]]);
        let mut trail = Trail::new(cnf.num_vars);
        assert_eq!(preprocess(&mut cnf, &mut trail), Preprocessed::Sat);
        assert_eq!(trail[1], VarState::Forced(true));
        assert_eq!(trail[3], VarState::Forced(true));
        assert!(trail.is_unassigned(2));
    }

    #[test]
    fn test_simplifies_and_is_idempotent() {
        let mut cnf = Cnf::new(vec![
            vec![1],
            vec![-1, 2, 3],
            vec![-2, 3, 4],
            vec![2, -4],
        ]);
        let mut trail = Trail::new(cnf.num_vars);
        assert_eq!(preprocess(&mut cnf, &mut trail), Preprocessed::Simplified);
        assert_eq!(trail.forced_prefix(), 1);
        assert_eq!(cnf.num_clauses(), 3);
        assert!(cnf.iter().flatten().all(|lit| lit.variable() != 1));

        let (simplified, prefix) = (cnf.clone(), trail.clone());
        assert_eq!(preprocess(&mut cnf, &mut trail), Preprocessed::Simplified);
        assert_eq!(cnf, simplified);
        assert_eq!(trail, prefix);
    }
}
