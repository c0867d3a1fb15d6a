//! A CNF satisfiability solver built around a single watched literal per
//! clause, an active variable worklist and a chronological backtracking
//! search that scales from plain enumeration up to DPLL.

/// The `sat` module holds the formula representation, the DIMACS parser and
/// the search engine.
pub mod sat;
