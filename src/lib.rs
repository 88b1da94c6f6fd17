//! Example-driven synthesis of small integer programs.
//!
//! A [`search::Search`] enumerates programs of a [`grammar::Grammar`]
//! best-first by cost, prunes partial programs that provably cannot reach
//! the largest expected output, and returns the first complete program
//! that reproduces every [`synth::Example`].

pub mod ast;
pub mod cost;
pub mod expr;
pub mod grammar;
pub mod interp;
pub mod search;
pub mod synth;
