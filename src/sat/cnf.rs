#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Flat clause storage for a CNF formula.
//!
//! All literals live in one shared array; `starts[i]..starts[i + 1]` is the
//! range of clause `i`. The first literal of each clause is its watched
//! literal. Besides watch swaps during search, the formula only changes when
//! [`Cnf::simplify`] compacts it after preprocessing.

use crate::sat::assignment::Solutions;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::Trail;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};
use std::ops::Index;

/// Index of a clause in the formula.
pub type ClauseId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    pub num_vars: usize,
    lits: Vec<Literal>,
    starts: Vec<usize>,
    names: FxHashMap<Variable, String>,
}

impl Default for Cnf {
    fn default() -> Self {
        Self {
            num_vars: 0,
            lits: Vec::new(),
            starts: vec![0],
            names: FxHashMap::default(),
        }
    }
}

impl Index<ClauseId> for Cnf {
    type Output = [Literal];

    fn index(&self, index: ClauseId) -> &Self::Output {
        &self.lits[self.starts[index]..self.starts[index + 1]]
    }
}

impl Cnf {
    /// Builds a formula from clauses in the signed-integer convention.
    ///
    /// The variable count is the largest variable mentioned. Empty clauses are
    /// kept: they make the formula unsatisfiable.
    pub fn new<I, J>(clauses: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = i32>,
    {
        let mut cnf = Self::default();
        for clause in clauses {
            cnf.add_clause(clause.into_iter().map(Literal::from_i32));
        }
        cnf
    }

    /// Appends a clause, growing the variable count if needed.
    pub fn add_clause(&mut self, clause: impl IntoIterator<Item = Literal>) {
        for lit in clause {
            self.num_vars = self.num_vars.max(lit.variable() as usize);
            self.lits.push(lit);
        }
        self.starts.push(self.lits.len());
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.starts.len() - 1
    }

    #[must_use]
    pub fn num_lits(&self) -> usize {
        self.lits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_clauses() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Literal]> {
        self.starts
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| &self.lits[a..b])
    }

    /// The first empty clause, if any.
    #[must_use]
    pub fn empty_clause(&self) -> Option<ClauseId> {
        self.iter().position(<[Literal]>::is_empty)
    }

    /// The literal in the watched slot of `clause`.
    #[must_use]
    pub fn watched(&self, clause: ClauseId) -> Literal {
        self.lits[self.starts[clause]]
    }

    /// Swaps the literal at offset `idx` of `clause` into the watched slot and
    /// returns it.
    pub fn swap_watch(&mut self, clause: ClauseId, idx: usize) -> Literal {
        let start = self.starts[clause];
        self.lits.swap(start, start + idx);
        self.lits[start]
    }

    #[must_use]
    pub fn name(&self, var: Variable) -> Option<&str> {
        self.names.get(&var).map(String::as_str)
    }

    pub fn set_name(&mut self, var: Variable, name: impl Into<String>) {
        self.num_vars = self.num_vars.max(var as usize);
        self.names.insert(var, name.into());
    }

    /// Checks that every clause has a literal made true by `solutions`.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.iter()
            .all(|clause| clause.iter().any(|&lit| solutions.check(lit)))
    }

    /// Removes satisfied clauses and false literals under `trail`, compacting
    /// the storage in place. Unassigned literals keep their relative order.
    pub fn simplify(&mut self, trail: &Trail) {
        let mut write = 0;
        let mut kept = 0;

        for clause in 0..self.num_clauses() {
            let (begin, end) = (self.starts[clause], self.starts[clause + 1]);
            let clause_start = write;
            let mut satisfied = false;

            for read in begin..end {
                let lit = self.lits[read];
                match trail.literal_value(lit) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        self.lits[write] = lit;
                        write += 1;
                    }
                }
            }

            if satisfied {
                write = clause_start;
            } else {
                self.starts[kept] = clause_start;
                kept += 1;
            }
        }

        self.starts[kept] = write;
        self.starts.truncate(kept + 1);
        self.lits.truncate(write);
        self.lits.shrink_to_fit();
        self.starts.shrink_to_fit();
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (var, name) in self.names.iter().sorted_by_key(|(v, _)| **v) {
            writeln!(f, "c {name} -> {var}")?;
        }
        writeln!(f, "p cnf {} {}", self.num_vars, self.num_clauses())?;
        for clause in self.iter() {
            for lit in clause {
                write!(f, "{lit} ")?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}
