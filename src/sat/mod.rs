#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod active;
pub mod assignment;
pub mod cnf;
pub mod configs;
pub mod dimacs;
pub mod literal;
pub mod preprocessing;
pub mod propagation;
pub mod sanity;
pub mod search;
pub mod solver;
pub mod trail;
pub mod watch;
