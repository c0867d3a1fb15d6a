#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The active variable set.
//!
//! A circular singly linked list over variable ids holding exactly the
//! unassigned variables that still watch at least one clause. Only `last` is
//! stored; the head is `next[last]`. A bitmap mirrors membership so the search
//! can test it in constant time.

use crate::sat::literal::Variable;
use crate::sat::watch::WatchLists;
use bit_vec::BitVec;
use std::iter;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveSet {
    last: Option<Variable>,
    next: Vec<Variable>,
    members: BitVec,
}

impl ActiveSet {
    /// Collects every watched variable, lowest id at the head.
    #[must_use]
    pub fn new(num_vars: usize, watches: &WatchLists) -> Self {
        let mut active = Self::with_capacity(num_vars);
        #[allow(clippy::cast_possible_truncation)]
        for var in (1..=num_vars as Variable).rev() {
            if watches.is_watched(var) {
                active.push(var);
            }
        }
        active
    }

    #[must_use]
    pub fn with_capacity(num_vars: usize) -> Self {
        Self {
            last: None,
            next: vec![0; num_vars + 1],
            members: BitVec::from_elem(num_vars + 1, false),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    #[must_use]
    pub fn contains(&self, var: Variable) -> bool {
        self.members.get(var as usize).unwrap_or(false)
    }

    #[must_use]
    pub fn head(&self) -> Option<Variable> {
        self.last.map(|last| self.next[last as usize])
    }

    /// Inserts `var` as the new head.
    pub fn push(&mut self, var: Variable) {
        debug_assert!(!self.contains(var), "variable {var} is already active");
        self.members.set(var as usize, true);
        match self.last {
            None => {
                self.next[var as usize] = var;
                self.last = Some(var);
            }
            Some(last) => {
                self.next[var as usize] = self.next[last as usize];
                self.next[last as usize] = var;
            }
        }
    }

    /// Removes and returns the head.
    pub fn pop(&mut self) -> Option<Variable> {
        let last = self.last?;
        let head = self.next[last as usize];
        if head == last {
            self.last = None;
        } else {
            self.next[last as usize] = self.next[head as usize];
        }
        self.members.set(head as usize, false);
        Some(head)
    }

    /// Members from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = Variable> + '_ {
        let last = self.last;
        iter::successors(self.head(), move |&v| {
            (Some(v) != last).then(|| self.next[v as usize])
        })
    }

    /// Scans members from the head and returns the first value produced by
    /// `f`. The member that produced it becomes the new head, so a following
    /// [`ActiveSet::pop`] removes exactly that variable.
    pub fn find_map<T>(&mut self, mut f: impl FnMut(Variable) -> Option<T>) -> Option<T> {
        let last = self.last?;
        let mut prev = last;
        loop {
            let var = self.next[prev as usize];
            if let Some(found) = f(var) {
                self.last = Some(prev);
                return Some(found);
            }
            if var == last {
                return None;
            }
            prev = var;
        }
    }
}
