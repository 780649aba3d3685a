//! The 1-in-3-SAT → SWE reduction.
//!
//! Every variable `u_i` becomes a consecutive letter pair `(pos, neg)`,
//! assigned in sorted-variable-id order starting from `A`. A `#posneg#`
//! pattern forces exactly one of the pair to be chosen (both share the
//! domain `{"0", "1"}`, and the fixed target string only contains `#01#`
//! and `#10#` at those positions, never `#00#`/`#11#`); a `#l1l2l3#`
//! pattern per clause forces exactly one of its three literals to read
//! `"1"`, by the same fixed-target argument applied to the clause's own
//! reserved slot. This is not part of the constraint-solving core — the
//! solver only ever sees the letters, domains, and patterns this module
//! hands it, never the underlying SAT problem.

use std::collections::HashMap;
use std::fmt;

use crate::solver::Assignment;

/// The fixed target string the reduction always solves against: one
/// `#posneg#` slot per variable followed by one `#l1l2l3#` slot per clause
/// shape actually reachable (one-true-of-two, then three one-true-of-three
/// shapes covering every literal-sign combination a clause can need).
pub const SAT_REDUCTION_TARGET: &str = "#01#10#001#010#100#";

/// A 1-in-3-SAT clause: which variable ids it references, and whether each
/// reference is positive (`true`) or negated (`false`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<(i64, bool)>,
}

impl Clause {
    pub fn new(literals: Vec<(i64, bool)>) -> Self {
        Clause { literals }
    }

    /// Build a clause from signed integers: negative magnitude means a
    /// negated reference to that variable id.
    pub fn from_signed_literals(signed: &[i64]) -> Self {
        Clause { literals: signed.iter().map(|&lit| (lit.abs(), lit > 0)).collect() }
    }

    pub fn literals(&self) -> &[(i64, bool)] {
        &self.literals
    }

    /// True iff exactly one literal in the clause is satisfied by
    /// `assignment`.
    pub fn satisfied(&self, assignment: &HashMap<i64, bool>) -> bool {
        let trues = self
            .literals
            .iter()
            .filter(|&&(var, positive)| {
                let value = assignment.get(&var).copied().unwrap_or(false);
                if positive { value } else { !value }
            })
            .count();
        trues == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// A clause did not reference exactly three literals.
    WrongClauseSize(usize),
    /// `from_swe` was called before `to_swe` had recorded a mapping.
    NoMappingRecorded,
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::WrongClauseSize(n) => write!(f, "clause must have exactly 3 literals, got {n}"),
            TranslateError::NoMappingRecorded => {
                write!(f, "cannot reverse-translate: call to_swe() before from_swe()")
            }
        }
    }
}

impl std::error::Error for TranslateError {}

/// Stateful: `to_swe` records the variable-id-to-letter-pair mapping that
/// `from_swe` later needs to read assignments back out.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    var_to_letters: HashMap<i64, (char, char)>,
    sorted_variables: Vec<i64>,
}

impl Translator {
    pub fn new() -> Self {
        Translator::default()
    }

    /// Translate `clauses` into a `(s, patterns, domains)` SWE instance.
    pub fn to_swe(&mut self, clauses: &[Clause]) -> Result<(String, Vec<String>, HashMap<char, Vec<String>>), TranslateError> {
        let mut sorted_variables: Vec<i64> = clauses.iter().flat_map(|c| c.literals.iter().map(|&(var, _)| var)).collect();
        sorted_variables.sort_unstable();
        sorted_variables.dedup();

        let mut var_to_letters = HashMap::with_capacity(sorted_variables.len());
        for (i, &var) in sorted_variables.iter().enumerate() {
            let pos = char::from(b'A' + (2 * i) as u8);
            let neg = char::from(b'A' + (2 * i + 1) as u8);
            var_to_letters.insert(var, (pos, neg));
        }

        let mut patterns = Vec::with_capacity(sorted_variables.len() + clauses.len());
        for &var in &sorted_variables {
            let (pos, neg) = var_to_letters[&var];
            patterns.push(format!("#{pos}{neg}#"));
        }

        for clause in clauses {
            if clause.literals.len() != 3 {
                return Err(TranslateError::WrongClauseSize(clause.literals.len()));
            }
            let mut ordered = clause.literals.clone();
            ordered.sort_unstable_by_key(|&(var, _)| var);
            let letters: String = ordered
                .iter()
                .map(|&(var, positive)| {
                    let (pos, neg) = var_to_letters[&var];
                    if positive { pos } else { neg }
                })
                .collect();
            patterns.push(format!("#{letters}#"));
        }

        let mut domains: HashMap<char, Vec<String>> = HashMap::new();
        for &(pos, neg) in var_to_letters.values() {
            domains.insert(pos, vec!["0".to_string(), "1".to_string()]);
            domains.insert(neg, vec!["0".to_string(), "1".to_string()]);
        }

        self.var_to_letters = var_to_letters;
        self.sorted_variables = sorted_variables;

        Ok((SAT_REDUCTION_TARGET.to_string(), patterns, domains))
    }

    /// Read a SWE solution back into a variable-id-to-boolean assignment.
    /// `pos_letter == "1"` means the variable is true; otherwise the
    /// negated letter decides, falling back to `false` if neither letter
    /// was assigned (which a valid solution never leaves the case).
    pub fn from_swe(&self, assignment: &Assignment) -> Result<HashMap<i64, bool>, TranslateError> {
        if self.var_to_letters.is_empty() {
            return Err(TranslateError::NoMappingRecorded);
        }

        Ok(self
            .sorted_variables
            .iter()
            .map(|&var| {
                let (pos, neg) = self.var_to_letters[&var];
                let value = match assignment.get(pos) {
                    Some("1") => true,
                    Some("0") | None => assignment.get(neg) == Some("1"),
                    Some(_) => false,
                };
                (var, value)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn assignment_from(pairs: &[(char, &str)]) -> Assignment {
        let map: BTreeMap<char, String> = pairs.iter().map(|&(c, v)| (c, v.to_string())).collect();
        Assignment::from_iter(map)
    }

    #[test]
    fn to_swe_assigns_consecutive_letter_pairs_in_sorted_variable_order() {
        let clauses = vec![Clause::from_signed_literals(&[1, -2, 3])];
        let mut translator = Translator::new();
        let (s, patterns, domains) = translator.to_swe(&clauses).unwrap();
        assert_eq!(s, SAT_REDUCTION_TARGET);
        assert_eq!(patterns, vec!["#AB#".to_string(), "#CD#".to_string(), "#EF#".to_string(), "#ADE#".to_string()]);
        assert_eq!(domains.get(&'A').unwrap(), &vec!["0".to_string(), "1".to_string()]);
        assert_eq!(domains.len(), 6);
    }

    #[test]
    fn to_swe_rejects_clauses_without_exactly_three_literals() {
        let clauses = vec![Clause::from_signed_literals(&[1, -2])];
        let err = Translator::new().to_swe(&clauses).unwrap_err();
        assert_eq!(err, TranslateError::WrongClauseSize(2));
    }

    #[test]
    fn from_swe_requires_a_prior_to_swe_call() {
        let assignment = assignment_from(&[('A', "1")]);
        let err = Translator::new().from_swe(&assignment).unwrap_err();
        assert_eq!(err, TranslateError::NoMappingRecorded);
    }

    #[test]
    fn from_swe_round_trips_a_satisfying_assignment() {
        let clauses = vec![Clause::from_signed_literals(&[1, -2, 3])];
        let mut translator = Translator::new();
        translator.to_swe(&clauses).unwrap();

        let assignment = assignment_from(&[('A', "1"), ('B', "0"), ('C', "0"), ('D', "1"), ('E', "1"), ('F', "0")]);
        let decoded = translator.from_swe(&assignment).unwrap();
        assert_eq!(decoded.get(&1), Some(&true));
        assert_eq!(decoded.get(&2), Some(&false));
        assert_eq!(decoded.get(&3), Some(&true));
    }

    #[test]
    fn clause_satisfied_counts_exactly_one_true_literal() {
        let clause = Clause::from_signed_literals(&[1, -2, 3]);
        let mut assignment = HashMap::new();
        assignment.insert(1, true);
        assignment.insert(2, true);
        assignment.insert(3, false);
        assert!(!clause.satisfied(&assignment));

        assignment.insert(2, false);
        assert!(clause.satisfied(&assignment));
    }
}
