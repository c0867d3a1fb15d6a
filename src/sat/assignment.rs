//! Per-variable search states and the model handed back to callers.

use crate::sat::literal::{Literal, Variable};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// The search state of a single variable.
///
/// Assigned states remember how the value came about: a free decision with the
/// other value still to explore, a decision whose both values have now been
/// tried, or a value forced by a unit clause (which has no second branch).
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash)]
pub enum VarState {
    #[default]
    Unassigned,
    /// Free decision; the opposite value has not been explored yet.
    Tried(bool),
    /// Current value after flipping; both values have been explored.
    BothTried(bool),
    /// Fixed by unit propagation.
    Forced(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        !self.is_unassigned()
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        matches!(self, Self::Unassigned)
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Unassigned => None,
            Self::Tried(b) | Self::BothTried(b) | Self::Forced(b) => Some(b),
        }
    }

    /// The state after backtracking into a `Tried` position.
    #[must_use]
    pub const fn flipped(self) -> Option<Self> {
        match self {
            Self::Tried(b) => Some(Self::BothTried(!b)),
            _ => None,
        }
    }
}

/// A satisfying assignment, one signed literal per variable, ordered by variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solutions {
    literals: Vec<Literal>,
}

impl Solutions {
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().sorted_unstable().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.literals
            .binary_search_by_key(&var, |l| l.variable())
            .ok()
            .map(|i| self.literals[i].polarity())
    }

    #[must_use]
    pub fn check(&self, lit: Literal) -> bool {
        self.value(lit.variable()) == Some(lit.polarity())
    }

    /// The clause excluding exactly this model, useful for enumerating further
    /// solutions with an external driver.
    #[must_use]
    pub fn blocking_clause(&self) -> Vec<Literal> {
        self.literals.iter().map(|l| l.negated()).collect()
    }
}

impl Display for Solutions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.literals.iter().join(" "))
    }
}
