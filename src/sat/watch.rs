#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The watch-list index.
//!
//! Every clause is watched by exactly one literal, the one in its first slot.
//! For each literal the clauses it watches form an intrusive singly linked
//! list: `heads` holds the first clause per literal and `next` chains clause
//! ids, so relocating a clause never allocates or copies literal data.

use crate::sat::cnf::{ClauseId, Cnf};
use crate::sat::literal::{Literal, Variable};
use std::fmt::{Display, Formatter};
use std::iter;

/// A clause with no literals was found while building the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyClause {
    pub clause: ClauseId,
}

impl Display for EmptyClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "clause {} is empty", self.clause)
    }
}

impl std::error::Error for EmptyClause {}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchLists {
    heads: Vec<Option<ClauseId>>,
    next: Vec<Option<ClauseId>>,
}

impl WatchLists {
    /// Builds the index with each clause watched by its current first literal.
    ///
    /// # Errors
    ///
    /// Returns the first clause that has no literal to watch.
    pub fn new(cnf: &Cnf) -> Result<Self, EmptyClause> {
        let mut watches = Self {
            heads: vec![None; 2 * (cnf.num_vars + 1)],
            next: vec![None; cnf.num_clauses()],
        };

        for (clause, lits) in cnf.iter().enumerate() {
            let Some(&first) = lits.first() else {
                return Err(EmptyClause { clause });
            };
            watches.push_front(first, clause);
        }

        Ok(watches)
    }

    #[must_use]
    pub fn head(&self, lit: Literal) -> Option<ClauseId> {
        self.heads[lit.index()]
    }

    pub fn set_head(&mut self, lit: Literal, clause: Option<ClauseId>) {
        self.heads[lit.index()] = clause;
    }

    /// Detaches the whole list of `lit`, returning its first clause.
    pub fn take(&mut self, lit: Literal) -> Option<ClauseId> {
        self.heads[lit.index()].take()
    }

    #[must_use]
    pub fn next(&self, clause: ClauseId) -> Option<ClauseId> {
        self.next[clause]
    }

    pub fn push_front(&mut self, lit: Literal, clause: ClauseId) {
        self.next[clause] = self.heads[lit.index()].replace(clause);
    }

    #[must_use]
    pub fn is_empty(&self, lit: Literal) -> bool {
        self.head(lit).is_none()
    }

    /// Whether either literal of `var` watches at least one clause.
    #[must_use]
    pub fn is_watched(&self, var: Variable) -> bool {
        !self.is_empty(Literal::new(var, true)) || !self.is_empty(Literal::new(var, false))
    }

    /// The clauses currently watched by `lit`, front to back.
    pub fn watchers(&self, lit: Literal) -> impl Iterator<Item = ClauseId> + '_ {
        iter::successors(self.head(lit), |&c| self.next(c))
    }
}
