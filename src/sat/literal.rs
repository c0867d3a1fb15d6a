#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literals and variables.
//!
//! A variable is a positive integer `1..=N`. A literal packs a variable and a
//! polarity into a single `u32`: `2 * var + 1` for the positive literal `+var`
//! and `2 * var` for the negative literal `-var`. The packed value doubles as an
//! index into per-literal arrays such as the watch list heads.

use core::ops::{Neg, Not};
use std::fmt::{Display, Formatter};

/// A variable identifier, `1..=num_vars`. Index 0 is never a real variable.
pub type Variable = u32;

/// A variable together with a polarity, packed as `2 * var + polarity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal(u32);

impl Literal {
    /// Creates the literal of `var` with the given polarity (`true` is the
    /// asserted literal, `false` the negated one).
    #[must_use]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        Self((var << 1) | polarity as u32)
    }

    /// Converts from the signed DIMACS convention.
    ///
    /// # Panics
    ///
    /// Panics on `0`, which is a clause terminator and not a literal.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        assert_ne!(value, 0, "0 is a clause terminator, not a literal");
        Self::new(value.unsigned_abs(), value.is_positive())
    }

    /// Converts to the signed DIMACS convention.
    #[must_use]
    pub fn to_i32(self) -> i32 {
        #[allow(clippy::cast_possible_wrap)]
        let var = self.variable() as i32;
        if self.polarity() { var } else { -var }
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 >> 1
    }

    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 & 1 == 1
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// The packed representation, usable as an array index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_packing() {
        assert_eq!(Literal::new(3, true).index(), 7);
        assert_eq!(Literal::new(3, false).index(), 6);
        assert_eq!(Literal::new(3, true).variable(), 3);
        assert!(Literal::new(3, true).polarity());
        assert!(!Literal::new(3, false).polarity());
    }

    #[test]
    fn test_literal_neg() {
        assert_eq!(Literal::new(1, false).negated(), Literal::new(1, true));
        assert_eq!(-Literal::new(1, true), Literal::new(1, false));
        assert_eq!(!!Literal::new(5, true), Literal::new(5, true));
    }

    #[test]
    fn test_signed_round_trip() {
        assert_eq!(Literal::from(-4).to_i32(), -4);
        assert_eq!(Literal::from(12).to_i32(), 12);
        assert_eq!(Literal::from(-4), Literal::new(4, false));
        assert_eq!(Literal::from(-4).to_string(), "-4");
    }

    #[test]
    #[should_panic(expected = "clause terminator")]
    fn test_zero_is_not_a_literal() {
        let _ = Literal::from_i32(0);
    }
}
