//! SWE solver engine.
//!
//! This module is the *public entry point* for the constraint-propagating
//! backtracking solver described in `SPEC_FULL.md`. It is split into focused
//! submodules under `src/solver/` while keeping public paths stable (for
//! example `crate::solver::Solver`).
//!
//! ## How the parts work together
//!
//! ```text
//! patterns (all)  ──┐
//!                   │  tokenize              (tokenizer.rs)
//!                   └──────────┬──────────────
//!                              │
//! R(X) domains ── OccurrenceIndex::build ─────┼─ advisory occurrence cache
//!                  (occurrence.rs)            │
//!                              v
//!                    Oracle::fits_at (oracle.rs)
//!                      - memoized per (pattern, token_index, position, α)
//!                              │
//!                              v
//!                    Search::run (search.rs)
//!                      - MRV variable choice
//!                      - least-constraining value order
//!                      - forward-check candidate_starts
//!                      - recurse / prune / backtrack
//!                              │
//!                              v
//!                       Option<Assignment>
//! ```
//!
//! ## Responsibilities by module
//!
//! - `tokenizer.rs`: turns a pattern string into `Literal`/`Var` tokens.
//! - `occurrence.rs`: advisory index of candidate-string positions in `s`.
//! - `oracle.rs`: the memoized feasibility check all pruning is built on.
//! - `search.rs`: the MRV + forward-checking backtracking search and its
//!   statistics.
//! - `solve.rs`: ties the above together behind the public `Solver` API,
//!   construction validation, and the `Assignment`/`InvalidInput` types.
//!
//! ## Debugging
//!
//! Set `SWE_DEBUG=1` to print variable-choice and pruning traces.

#[path = "solver/occurrence.rs"]
mod occurrence;
#[path = "solver/oracle.rs"]
mod oracle;
#[path = "solver/search.rs"]
mod search;
#[path = "solver/solve.rs"]
mod solve;
#[path = "solver/tokenizer.rs"]
mod tokenizer;

use std::collections::BTreeMap;
use std::rc::Rc;

/// A partial variable assignment as seen by the oracle and search: a
/// `BTreeMap` so iteration order is always ascending by variable symbol,
/// which is exactly the canonical form the feasibility memo key needs.
pub(crate) type PartialAssignment = BTreeMap<char, Rc<str>>;

pub use search::{CancellationToken, SolveOptions, Stats};
pub use solve::{expand, Assignment, InvalidInput, Solver};
pub use tokenizer::Token;
