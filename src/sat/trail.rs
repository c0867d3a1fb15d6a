#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The assignment trail: the stack of assigned variables and their states.

use crate::sat::assignment::{Solutions, VarState};
use crate::sat::literal::{Literal, Variable};
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    vars: Vec<Variable>,
    states: Vec<VarState>,
}

impl Index<Variable> for Trail {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.states[index as usize]
    }
}

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            vars: Vec::with_capacity(num_vars),
            states: vec![VarState::Unassigned; num_vars + 1],
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.states.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.vars.len() == self.num_vars()
    }

    #[must_use]
    pub fn top(&self) -> Option<Variable> {
        self.vars.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, VarState)> + '_ {
        self.vars.iter().map(|&v| (v, self[v]))
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self[var].value()
    }

    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.value(lit.variable()).map(|b| b == lit.polarity())
    }

    #[must_use]
    pub fn is_false(&self, lit: Literal) -> bool {
        self.literal_value(lit) == Some(false)
    }

    #[must_use]
    pub fn is_true(&self, lit: Literal) -> bool {
        self.literal_value(lit) == Some(true)
    }

    #[must_use]
    pub fn is_unassigned(&self, var: Variable) -> bool {
        self[var].is_unassigned()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn variables(&self) -> impl Iterator<Item = Variable> + use<> {
        1..=self.num_vars() as Variable
    }

    /// The lowest-numbered unassigned variable, the plain enumeration order.
    #[must_use]
    pub fn first_unassigned(&self) -> Option<Variable> {
        self.variables().find(|&v| self.is_unassigned(v))
    }

    fn push(&mut self, var: Variable, state: VarState) {
        debug_assert!(self.is_unassigned(var), "variable {var} assigned twice");
        self.states[var as usize] = state;
        self.vars.push(var);
    }

    /// Makes a free decision and returns the literal that became false.
    pub fn decide(&mut self, var: Variable, value: bool) -> Literal {
        self.push(var, VarState::Tried(value));
        Literal::new(var, !value)
    }

    /// Records a forced literal and returns its negation, which became false.
    pub fn force(&mut self, lit: Literal) -> Literal {
        self.push(lit.variable(), VarState::Forced(lit.polarity()));
        lit.negated()
    }

    /// Unwinds the trail to the most recent decision with an untried value.
    ///
    /// Every `BothTried` or `Forced` variable on top of the trail is unassigned
    /// and handed to `on_unassign`. The first `Tried` variable found is flipped
    /// in place and the literal it just falsified is returned. `None` means the
    /// trail emptied and the search space is exhausted.
    pub fn backtrack(&mut self, mut on_unassign: impl FnMut(Variable)) -> Option<Literal> {
        while let Some(var) = self.top() {
            if let Some(flipped) = self[var].flipped() {
                self.states[var as usize] = flipped;
                return flipped.value().map(|b| Literal::new(var, !b));
            }
            self.vars.pop();
            self.states[var as usize] = VarState::Unassigned;
            on_unassign(var);
        }
        None
    }

    /// Assigns every remaining variable to `true`.
    ///
    /// Used once the search knows the leftover variables cannot affect any
    /// clause, so the trail covers all variables.
    pub fn complete(&mut self) {
        for var in self.variables() {
            if self.is_unassigned(var) {
                self.push(var, VarState::Tried(true));
            }
        }
    }

    #[must_use]
    pub fn forced_prefix(&self) -> usize {
        self.vars
            .iter()
            .take_while(|&&v| matches!(self[v], VarState::Forced(_)))
            .count()
    }

    #[must_use]
    pub fn solutions(&self) -> Solutions {
        Solutions::new(
            self.iter()
                .filter_map(|(v, s)| s.value().map(|b| Literal::new(v, b))),
        )
    }
}
