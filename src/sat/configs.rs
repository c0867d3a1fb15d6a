#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Solver configuration.
//!
//! The search driver has three switches (watch lists, active list, unit
//! propagation) but each one is only meaningful on top of the previous, so
//! the combinations are exposed as a single [`Algorithm`].

use clap::ValueEnum;
use std::fmt::Display;

/// Which layers of the search driver are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Algorithm {
    /// Plain enumeration with a full clause re-scan after every assignment.
    Naive,
    /// Enumeration with conflicts detected through watch lists.
    Watch,
    /// Decisions drawn from the active variable set.
    Active,
    /// Active set plus unit propagation.
    #[default]
    Dpll,
}

impl Algorithm {
    /// All configurations, from the baseline up.
    pub const ALL: [Self; 4] = [Self::Naive, Self::Watch, Self::Active, Self::Dpll];

    #[must_use]
    pub const fn use_watch_lists(self) -> bool {
        !matches!(self, Self::Naive)
    }

    #[must_use]
    pub const fn use_active_list(self) -> bool {
        matches!(self, Self::Active | Self::Dpll)
    }

    #[must_use]
    pub const fn use_propagation(self) -> bool {
        matches!(self, Self::Dpll)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Naive => write!(f, "naive"),
            Self::Watch => write!(f, "watch"),
            Self::Active => write!(f, "active"),
            Self::Dpll => write!(f, "dpll"),
        }
    }
}

/// Value given to a variable on a free decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Polarity {
    /// False only when the variable watches clauses negatively and none
    /// positively, so the decision falsifies an empty list.
    #[default]
    Watch,
    True,
    False,
    Random,
}

impl Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Watch => write!(f, "watch"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Random => write!(f, "random"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverConfig {
    pub algorithm: Algorithm,
    pub polarity: Polarity,
    /// Run unit propagation over the formula and simplify it before search.
    pub preprocess: bool,
    /// Check trail, watch-list and active-set consistency at every step and
    /// panic on the first violation.
    pub check_invariants: bool,
}

impl SolverConfig {
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    #[must_use]
    pub const fn with_preprocessing(mut self, preprocess: bool) -> Self {
        self.preprocess = preprocess;
        self
    }

    #[must_use]
    pub const fn with_invariant_checks(mut self, check_invariants: bool) -> Self {
        self.check_invariants = check_invariants;
        self
    }
}
