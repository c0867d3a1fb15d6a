#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conflict propagation.
//!
//! Reacting to a literal becoming false: either by repairing the watch lists
//! of the clauses it watched, or, without watch lists, by scanning the whole
//! formula for a falsified clause. Also hosts unit-clause detection over the
//! active set.

use crate::sat::active::ActiveSet;
use crate::sat::cnf::{ClauseId, Cnf};
use crate::sat::literal::Literal;
use crate::sat::trail::Trail;
use crate::sat::watch::WatchLists;
use std::fmt::{Display, Formatter};

/// A clause whose literals are all false under the current assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub clause: ClauseId,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "clause {} is falsified", self.clause)
    }
}

/// Offset of a literal after the watched slot of `clause` that is not false.
#[must_use]
pub fn replacement(cnf: &Cnf, trail: &Trail, clause: ClauseId) -> Option<usize> {
    cnf[clause]
        .iter()
        .skip(1)
        .position(|&lit| !trail.is_false(lit))
        .map(|i| i + 1)
}

/// Whether the watched literal of `clause` is the only one not yet false.
///
/// Only meaningful for clauses watched by an unassigned literal.
#[must_use]
pub fn is_unit(cnf: &Cnf, trail: &Trail, clause: ClauseId) -> bool {
    let lits = &cnf[clause];
    debug_assert!(trail.is_unassigned(lits[0].variable()));
    lits[1..].iter().all(|&lit| trail.is_false(lit))
}

/// Moves every clause watched by `lit`, which has just become false, onto a
/// literal that is not false.
///
/// A variable that starts watching a clause while unassigned joins `active`
/// if it was not already a member.
///
/// # Errors
///
/// On a clause with no replacement the repair stops and that clause is
/// returned. Clauses already moved stay moved; the failing clause and every
/// clause after it remain on `lit`'s list.
pub fn repair(
    cnf: &mut Cnf,
    trail: &Trail,
    watches: &mut WatchLists,
    mut active: Option<&mut ActiveSet>,
    lit: Literal,
) -> Result<(), Conflict> {
    let mut cursor = watches.take(lit);

    while let Some(clause) = cursor {
        cursor = watches.next(clause);

        let Some(idx) = replacement(cnf, trail, clause) else {
            watches.set_head(lit, Some(clause));
            return Err(Conflict { clause });
        };

        let new_lit = cnf.swap_watch(clause, idx);
        let var = new_lit.variable();
        if let Some(active) = active.as_deref_mut() {
            if trail.is_unassigned(var) && !active.contains(var) {
                active.push(var);
            }
        }
        watches.push_front(new_lit, clause);
    }

    Ok(())
}

/// Finds a unit clause among those watched by active variables and returns
/// its forced literal. The variable of that literal becomes the head of
/// `active`.
pub fn next_unit_clause(
    cnf: &Cnf,
    trail: &Trail,
    watches: &WatchLists,
    active: &mut ActiveSet,
) -> Option<Literal> {
    active.find_map(|var| {
        [Literal::new(var, false), Literal::new(var, true)]
            .into_iter()
            .flat_map(|lit| watches.watchers(lit))
            .find(|&clause| is_unit(cnf, trail, clause))
            .map(|clause| cnf.watched(clause))
    })
}

/// The first clause that is false in full, by exhaustive scan.
///
/// # Errors
///
/// Returns the falsified clause.
pub fn rescan(cnf: &Cnf, trail: &Trail) -> Result<(), Conflict> {
    match cnf
        .iter()
        .position(|clause| clause.iter().all(|&lit| trail.is_false(lit)))
    {
        Some(clause) => Err(Conflict { clause }),
        None => Ok(()),
    }
}
