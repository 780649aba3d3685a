//! A constraint-propagating backtracking solver for the Substring-With-
//! Expansions (SWE) problem: given a target string `s`, a list of patterns
//! over literals and variables, and a finite domain of candidate strings
//! per variable, find an assignment such that every expanded pattern is a
//! substring of `s`.
//!
//! The solver itself (`solver`) is the algorithmic core and knows nothing
//! about file formats or the 1-in-3-SAT reduction; those live in `io` as
//! surrounding collaborators, the same way this crate's CLI binary is a
//! thin consumer of the library rather than part of it.

extern crate self as swe_solver;

pub mod io;
pub mod solver;

pub use solver::{expand, Assignment, CancellationToken, InvalidInput, SolveOptions, Solver, Stats};

/// Integration-style tests covering the seed end-to-end scenarios from
/// `SPEC_FULL.md` §8, exercising `io` and `solver` together the way the CLI
/// binary does, rather than each module in isolation.
#[cfg(test)]
mod tests {
    use crate::io::{Clause, Translator};
    use crate::Solver;

    /// Scenario 4: a single clause `u1 ∨ u2 ∨ u3` run through the full
    /// `Translator::to_swe` -> `Solver::solve` -> `Translator::from_swe`
    /// pipeline, not just `to_swe`'s output shape.
    #[test]
    fn one_in_three_sat_reduction_round_trips_through_the_real_solver() {
        let clauses = vec![Clause::from_signed_literals(&[1, 2, 3])];
        let mut translator = Translator::new();
        let (s, patterns, domains) = translator.to_swe(&clauses).unwrap();

        let mut solver = Solver::new(s, patterns, domains).unwrap();
        let solution = solver.solve().expect("a satisfying assignment must exist for a trivially satisfiable clause");

        for (pos, neg) in [('A', 'B'), ('C', 'D'), ('E', 'F')] {
            let pos_is_one = solution.get(pos) == Some("1");
            let neg_is_one = solution.get(neg) == Some("1");
            assert_ne!(pos_is_one, neg_is_one, "exactly one of ({pos}, {neg}) must be \"1\"");
        }

        let true_count = ['A', 'C', 'E'].iter().filter(|&&v| solution.get(v) == Some("1")).count();
        assert_eq!(true_count, 1, "exactly one of A, C, E must be \"1\"");

        let decoded = translator.from_swe(&solution).unwrap();
        assert!(clauses[0].satisfied(&decoded), "decoded assignment must satisfy the original clause 1-in-3");
    }
}
