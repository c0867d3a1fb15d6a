#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Consistency checks between the trail, the watch lists and the active set.
//!
//! These never fail on a correct search; a violation is a bug. The search
//! driver runs them between steps when asked to and panics on the first one.

use crate::sat::active::ActiveSet;
use crate::sat::cnf::{ClauseId, Cnf};
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::Trail;
use crate::sat::watch::WatchLists;
use bit_vec::BitVec;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A variable occurs on the trail more than once.
    DuplicateOnTrail { var: Variable },
    /// A variable on the trail has no value.
    UnassignedOnTrail { var: Variable },
    /// A variable has a value but is not on the trail.
    AssignedOffTrail { var: Variable },
    /// A clause is in no watch list.
    Unwatched { clause: ClauseId },
    /// A clause is reachable from more than one list, or twice from one.
    WatchedTwice { clause: ClauseId },
    /// A clause sits in the list of a literal other than its first.
    MisfiledWatch { clause: ClauseId, list: Literal },
    /// A clause is watched by a false literal.
    FalseWatch { clause: ClauseId, lit: Literal },
    /// Active-set membership disagrees with the variable's state.
    ActiveMembership { var: Variable, member: bool },
    /// The linked list and the membership bitmap hold different counts.
    ActiveCount { linked: usize, members: usize },
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateOnTrail { var } => write!(f, "variable {var} is on the trail twice"),
            Self::UnassignedOnTrail { var } => {
                write!(f, "variable {var} is on the trail but unassigned")
            }
            Self::AssignedOffTrail { var } => {
                write!(f, "variable {var} is assigned but not on the trail")
            }
            Self::Unwatched { clause } => write!(f, "clause {clause} is in no watch list"),
            Self::WatchedTwice { clause } => write!(f, "clause {clause} is watched twice"),
            Self::MisfiledWatch { clause, list } => {
                write!(f, "clause {clause} is in the list of {list} but does not start with it")
            }
            Self::FalseWatch { clause, lit } => {
                write!(f, "clause {clause} is watched by false literal {lit}")
            }
            Self::ActiveMembership { var, member: true } => {
                write!(f, "variable {var} is active but assigned or unwatched")
            }
            Self::ActiveMembership { var, member: false } => {
                write!(f, "variable {var} is unassigned and watched but not active")
            }
            Self::ActiveCount { linked, members } => {
                write!(f, "active list links {linked} variables but marks {members}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

#[allow(clippy::cast_possible_truncation)]
fn variables(num_vars: usize) -> impl Iterator<Item = Variable> {
    1..=num_vars as Variable
}

/// Every trail entry is assigned exactly once and every assigned variable is
/// on the trail.
///
/// # Errors
///
/// The first inconsistency found.
pub fn check_trail(trail: &Trail) -> Result<(), InvariantViolation> {
    let mut seen = BitVec::from_elem(trail.num_vars() + 1, false);

    for (var, state) in trail.iter() {
        if seen.get(var as usize).unwrap_or(false) {
            return Err(InvariantViolation::DuplicateOnTrail { var });
        }
        seen.set(var as usize, true);
        if !state.is_assigned() {
            return Err(InvariantViolation::UnassignedOnTrail { var });
        }
    }

    variables(trail.num_vars())
        .find(|&var| !trail.is_unassigned(var) && !seen.get(var as usize).unwrap_or(false))
        .map_or(Ok(()), |var| Err(InvariantViolation::AssignedOffTrail { var }))
}

/// Every clause is in exactly one list, that of its first literal, and that
/// literal is not false.
///
/// # Errors
///
/// The first inconsistency found.
pub fn check_watch_lists(
    cnf: &Cnf,
    trail: &Trail,
    watches: &WatchLists,
) -> Result<(), InvariantViolation> {
    let mut seen = BitVec::from_elem(cnf.num_clauses(), false);

    for var in variables(cnf.num_vars) {
        for list in [Literal::new(var, false), Literal::new(var, true)] {
            for clause in watches.watchers(list) {
                // Also stops a cycle in the links.
                if seen.get(clause).unwrap_or(false) {
                    return Err(InvariantViolation::WatchedTwice { clause });
                }
                seen.set(clause, true);

                let lit = cnf.watched(clause);
                if lit != list {
                    return Err(InvariantViolation::MisfiledWatch { clause, list });
                }
                if trail.is_false(lit) {
                    return Err(InvariantViolation::FalseWatch { clause, lit });
                }
            }
        }
    }

    seen.iter()
        .position(|watched| !watched)
        .map_or(Ok(()), |clause| Err(InvariantViolation::Unwatched { clause }))
}

/// A variable is active iff it is unassigned and watches some clause.
///
/// # Errors
///
/// The first inconsistency found.
pub fn check_active_set(
    trail: &Trail,
    watches: &WatchLists,
    active: &ActiveSet,
) -> Result<(), InvariantViolation> {
    let mut members = 0;
    for var in variables(trail.num_vars()) {
        let member = active.contains(var);
        if member != (trail.is_unassigned(var) && watches.is_watched(var)) {
            return Err(InvariantViolation::ActiveMembership { var, member });
        }
        members += usize::from(member);
    }

    let linked = active.iter().take(members + 1).count();
    if linked == members {
        Ok(())
    } else {
        Err(InvariantViolation::ActiveCount { linked, members })
    }
}
