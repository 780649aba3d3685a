//! Collaborators: file readers, the 1-in-3-SAT reduction, and the
//! preprocessor.
//!
//! None of this is part of the algorithmic core (`crate::solver`); the
//! solver is deliberately ignorant of which reader produced its
//! `(s, patterns, domains)` triple, per `SPEC_FULL.md` §6. This module
//! exists so the crate ships the full pipeline the original program wires
//! together in `main`, not just the isolated solver.

#[path = "io/preprocessor.rs"]
mod preprocessor;
#[path = "io/reader.rs"]
mod reader;
#[path = "io/translator.rs"]
mod translator;

pub use preprocessor::preprocess;
pub use reader::{read_oit_file, read_oit_str, read_swe_file, read_swe_stdin, read_swe_str, ReadError};
pub use translator::{Clause, TranslateError, Translator, SAT_REDUCTION_TARGET};

/// The raw `(s, patterns, domains)` triple a reader or translator produces,
/// before it is handed to `solver::Solver::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweInstance {
    pub s: String,
    pub patterns: Vec<String>,
    pub domains: std::collections::HashMap<char, Vec<String>>,
}
