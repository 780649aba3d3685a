//! Construction, validation, and the public `Solver` surface.
//!
//! This is the operational equivalent of the reference engine's
//! `parser.rs`: it owns the instance data, wires the tokenizer, occurrence
//! index, oracle, and search together, and exposes the handful of public
//! entry points (`Solver::new`, `solve`, `solve_with`, `stats`).

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::occurrence::OccurrenceIndex;
use super::oracle::{MemoCap, Oracle};
use super::search::{initial_candidate_starts, Search, SolveOptions, Stats};
use super::tokenizer::{tokenize, Token};

/// Construction-time validation failure (`SPEC_FULL.md` §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// The target string `s` was empty.
    EmptyTargetString,
    /// A variable symbol outside `'A'..='Z'` appeared as a domain key.
    VariableOutOfRange(char),
    /// A pattern referenced a variable with no entry in the domain map.
    UnknownVariable(char),
    /// A variable's domain was empty.
    EmptyDomain(char),
    /// A candidate string in some domain was empty.
    EmptyCandidateString(char),
}

impl std::fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::EmptyTargetString => write!(f, "target string `s` must not be empty"),
            InvalidInput::VariableOutOfRange(c) => {
                write!(f, "variable symbol '{c}' is outside the supported A-Z alphabet")
            }
            InvalidInput::UnknownVariable(c) => {
                write!(f, "pattern references variable '{c}' with no entry in R")
            }
            InvalidInput::EmptyDomain(c) => write!(f, "domain R({c}) is empty"),
            InvalidInput::EmptyCandidateString(c) => {
                write!(f, "domain R({c}) contains an empty candidate string")
            }
        }
    }
}

impl std::error::Error for InvalidInput {}

/// A total assignment of variables to chosen strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment(BTreeMap<char, String>);

impl Assignment {
    pub fn get(&self, var: char) -> Option<&str> {
        self.0.get(&var).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.0.iter().map(|(&v, s)| (v, s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true iff every chosen value is present in its variable's
    /// domain, per `R`. Used by collaborators for sanity checking, not by
    /// the solver itself (which only ever produces domain-valid values).
    pub fn is_valid(&self, domains: &HashMap<char, Vec<String>>) -> bool {
        self.0.iter().all(|(var, value)| domains.get(var).is_some_and(|d| d.iter().any(|r| r == value)))
    }

    fn from_partial(partial: super::PartialAssignment) -> Self {
        Assignment(partial.iter().map(|(&v, r)| (v, r.to_string())).collect())
    }
}

impl FromIterator<(char, String)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (char, String)>>(iter: I) -> Self {
        Assignment(iter.into_iter().collect())
    }
}

/// Replace every `Var(X)` in `pattern` with `assignment`'s value for `X`,
/// leaving literals unchanged. `expand(t, α)` from the glossary.
pub fn expand(pattern: &str, assignment: &Assignment) -> String {
    pattern
        .chars()
        .map(|c| if c.is_ascii_uppercase() { assignment.get(c).unwrap_or_default().to_string() } else { c.to_string() })
        .collect()
}

/// A single SWE instance, owning its target string, tokenized patterns, and
/// variable domains, plus the statistics from the most recent `solve` call.
pub struct Solver {
    s: Vec<char>,
    patterns: Vec<Vec<Token>>,
    variables: Vec<char>,
    domains: HashMap<char, Vec<String>>,
    stats: Stats,
}

impl Solver {
    /// Build a `Solver` for `(s, patterns, domains)`, validating the
    /// construction-time invariants from `SPEC_FULL.md` §6.
    pub fn new(
        s: impl Into<String>,
        patterns: Vec<String>,
        domains: HashMap<char, Vec<String>>,
    ) -> Result<Self, InvalidInput> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidInput::EmptyTargetString);
        }

        for &var in domains.keys() {
            if !var.is_ascii_uppercase() {
                return Err(InvalidInput::VariableOutOfRange(var));
            }
        }

        let mut normalized_domains: HashMap<char, Vec<String>> = HashMap::with_capacity(domains.len());
        for (var, values) in domains {
            if values.is_empty() {
                return Err(InvalidInput::EmptyDomain(var));
            }
            if values.iter().any(String::is_empty) {
                return Err(InvalidInput::EmptyCandidateString(var));
            }
            let mut sorted = values;
            sorted.sort();
            sorted.dedup();
            normalized_domains.insert(var, sorted);
        }

        let tokenized: Vec<Vec<Token>> = patterns.iter().map(|p| tokenize(p)).collect();
        for tokens in &tokenized {
            for token in tokens {
                if let Token::Var(var) = *token {
                    if !normalized_domains.contains_key(&var) {
                        return Err(InvalidInput::UnknownVariable(var));
                    }
                }
            }
        }

        let mut variables: Vec<char> = normalized_domains.keys().copied().collect();
        variables.sort_unstable();

        Ok(Solver { s: s.chars().collect(), patterns: tokenized, variables, domains: normalized_domains, stats: Stats::default() })
    }

    /// `solve()` using default `SolveOptions` (no memo cap, no cancellation).
    pub fn solve(&mut self) -> Option<Assignment> {
        self.solve_with(&SolveOptions::default())
    }

    /// `solve()` with caller-supplied tuning. Never partially mutates
    /// `Solver` state on any return path: `s`, `patterns`, and `domains` are
    /// untouched, only `stats` (solve-scoped working state) is refreshed.
    pub fn solve_with(&mut self, options: &SolveOptions) -> Option<Assignment> {
        let oracle = Oracle::new(&self.s, &self.patterns, &self.domains, MemoCap(options.memo_cap));
        oracle.reset();

        let debug = std::env::var_os("SWE_DEBUG").is_some();
        let occurrence_index = OccurrenceIndex::build(&self.s, self.domains.values().flatten().map(String::as_str));
        let candidate_starts =
            initial_candidate_starts(&oracle, &occurrence_index, &self.patterns, &self.domains, self.s.len(), debug);

        let search = Search::new(&oracle, &self.variables, &self.domains, self.patterns.len(), options);
        let (result, stats) = search.run(candidate_starts);
        self.stats = stats;

        result.map(Assignment::from_partial)
    }

    /// Statistics from the most recent `solve`/`solve_with` call.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The variables this instance was constructed with, ascending.
    pub fn variables(&self) -> &[char] {
        &self.variables
    }

    /// The (sorted, deduplicated) domain for `var`, if any.
    pub fn domain(&self, var: char) -> Option<&[String]> {
        self.domains.get(&var).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_literal_pattern_solves_with_empty_assignment() {
        let mut solver = Solver::new("abc", vec!["a".to_string(), "bc".to_string()], HashMap::new()).unwrap();
        let solution = solver.solve().unwrap();
        assert!(solution.is_empty());
    }

    #[test]
    fn single_variable_instance() {
        let domains = HashMap::from([('X', vec!["ello".to_string(), "eap".to_string()])]);
        let mut solver = Solver::new("helloworld", vec!["hX".to_string()], domains).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.get('X'), Some("ello"));
    }

    #[test]
    fn unsatisfiable_instance_returns_none() {
        let domains = HashMap::from([('X', vec!["a".to_string()]), ('Y', vec!["c".to_string()])]);
        let mut solver = Solver::new("ab", vec!["XY".to_string()], domains).unwrap();
        assert!(solver.solve().is_none());
        assert!(solver.stats().states_explored >= 1);
    }

    #[test]
    fn shared_structure_across_two_patterns() {
        let domains = HashMap::from([('X', vec!["ab".to_string(), "abx".to_string()])]);
        let mut solver =
            Solver::new("xabxaby", vec!["xX".to_string(), "Xy".to_string()], domains).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.get('X'), Some("ab"));
    }

    #[test]
    fn construction_rejects_empty_target_string() {
        assert_eq!(Solver::new("", vec![], HashMap::new()), Err(InvalidInput::EmptyTargetString));
    }

    #[test]
    fn construction_rejects_unknown_variable_reference() {
        let err = Solver::new("abc", vec!["X".to_string()], HashMap::new()).unwrap_err();
        assert_eq!(err, InvalidInput::UnknownVariable('X'));
    }

    #[test]
    fn construction_rejects_empty_domain() {
        let domains = HashMap::from([('X', Vec::<String>::new())]);
        let err = Solver::new("abc", vec!["X".to_string()], domains).unwrap_err();
        assert_eq!(err, InvalidInput::EmptyDomain('X'));
    }

    #[test]
    fn construction_rejects_empty_candidate_string() {
        let domains = HashMap::from([('X', vec!["".to_string()])]);
        let err = Solver::new("abc", vec!["X".to_string()], domains).unwrap_err();
        assert_eq!(err, InvalidInput::EmptyCandidateString('X'));
    }

    #[test]
    fn construction_rejects_out_of_range_variable_symbol() {
        let domains = HashMap::from([('é', vec!["x".to_string()])]);
        let err = Solver::new("abc", vec![], domains).unwrap_err();
        assert_eq!(err, InvalidInput::VariableOutOfRange('é'));
    }

    #[test]
    fn unreferenced_variable_does_not_block_solvability() {
        let domains = HashMap::from([('Y', vec!["z".to_string()])]);
        let mut solver = Solver::new("abc", vec!["a".to_string()], domains).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.get('Y'), Some("z"));
    }

    #[test]
    fn expand_replaces_variables_and_keeps_literals() {
        let domains = HashMap::from([('X', vec!["ello".to_string()])]);
        let mut solver = Solver::new("helloworld", vec!["hX".to_string()], domains).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(expand("hX", &solution), "hello");
    }

    #[test]
    fn theoretical_totals_reflect_domain_sizes() {
        let domains = HashMap::from([
            ('A', vec!["a".into(), "b".into()]),
            ('B', vec!["a".into(), "b".into(), "c".into()]),
            ('C', vec!["a".into(), "b".into(), "c".into(), "d".into()]),
        ]);
        let solver = Solver::new("abcd", vec![], domains).unwrap();
        let sizes: Vec<usize> = solver.variables().iter().map(|v| solver.domain(*v).unwrap().len()).collect();
        let (leaves, total_nodes) = Stats::theoretical_totals(&sizes);
        assert_eq!(leaves, 24);
        assert_eq!(total_nodes, 33);
    }
}
