//! Native SWE-instance and OIT-clause file readers.
//!
//! File shapes mirror the two readers of the reference implementation: a
//! line-oriented SWE format (`k`, then `s`, then `k` pattern lines, then
//! `R(X): v1,v2,...` domain lines) and a one-line OIT (1-in-3-SAT) clause
//! format (`#`-separated clauses of comma-separated signed integer
//! literals). Validation uses compiled regexes the way the native-format
//! parsers in this corpus do, via `once_cell::sync::Lazy`.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::translator::Clause;
use super::SweInstance;

/// `R(X): v1,v2,...` — one variable symbol, then a comma-separated,
/// non-empty list of candidate strings.
static DOMAIN_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z]):(.+)$").unwrap());

/// A signed literal in an OIT clause: an optional `-`, then a positive
/// integer variable id.
static LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

#[derive(Debug)]
pub enum ReadError {
    Io(std::io::Error),
    /// The file ended before the declared number of pattern or domain
    /// lines had been read.
    UnexpectedEof { expected_at_least: usize, found: usize },
    /// The `k` header line was not a non-negative integer.
    InvalidHeader(String),
    /// A domain line did not match `letter:values`.
    MalformedDomainLine(String),
    /// A domain line's values were empty after splitting on `,`.
    EmptyDomainValues(String),
    /// An OIT clause did not have exactly three literals.
    MalformedClause(String),
    /// A literal in an OIT clause was not a signed integer.
    MalformedLiteral(String),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Io(err) => write!(f, "i/o error: {err}"),
            ReadError::UnexpectedEof { expected_at_least, found } => {
                write!(f, "unexpected end of input: expected at least {expected_at_least} lines, found {found}")
            }
            ReadError::InvalidHeader(line) => write!(f, "expected a non-negative integer for k, got '{line}'"),
            ReadError::MalformedDomainLine(line) => write!(f, "malformed domain line '{line}', expected 'X:v1,v2,...'"),
            ReadError::EmptyDomainValues(var) => write!(f, "domain line for '{var}' has no values"),
            ReadError::MalformedClause(clause) => {
                write!(f, "malformed OIT clause '{clause}', expected exactly 3 literals")
            }
            ReadError::MalformedLiteral(literal) => write!(f, "malformed OIT literal '{literal}', expected a signed integer"),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        ReadError::Io(err)
    }
}

/// Read a native SWE instance from `path`.
pub fn read_swe_file(path: impl AsRef<Path>) -> Result<SweInstance, ReadError> {
    let text = std::fs::read_to_string(path)?;
    parse_swe(&text)
}

/// Read a native SWE instance from stdin.
pub fn read_swe_stdin() -> Result<SweInstance, ReadError> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    parse_swe(&text)
}

/// Read a native SWE instance from an in-memory string. Exposed separately
/// from `read_swe_file` so callers (and tests) can exercise the format
/// without touching the filesystem.
pub fn read_swe_str(text: &str) -> Result<SweInstance, ReadError> {
    parse_swe(text)
}

fn parse_swe(text: &str) -> Result<SweInstance, ReadError> {
    let lines: Vec<&str> = text.lines().collect();

    let header = lines.first().ok_or(ReadError::UnexpectedEof { expected_at_least: 2, found: lines.len() })?;
    let k: usize =
        header.trim().parse().map_err(|_| ReadError::InvalidHeader(header.to_string()))?;

    let s = lines.get(1).ok_or(ReadError::UnexpectedEof { expected_at_least: 2, found: lines.len() })?.trim().to_string();

    if lines.len() < 2 + k {
        return Err(ReadError::UnexpectedEof { expected_at_least: 2 + k, found: lines.len() });
    }
    let patterns: Vec<String> = lines[2..2 + k].iter().map(|line| line.trim().to_string()).collect();

    let mut domains: HashMap<char, Vec<String>> = HashMap::new();
    for line in &lines[2 + k..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let captures = DOMAIN_LINE.captures(line).ok_or_else(|| ReadError::MalformedDomainLine(line.to_string()))?;
        let var = captures[1].chars().next().unwrap().to_ascii_uppercase();
        let values: Vec<String> = captures[2].split(',').map(str::trim).map(str::to_string).filter(|v| !v.is_empty()).collect();
        if values.is_empty() {
            return Err(ReadError::EmptyDomainValues(var.to_string()));
        }
        domains.insert(var, values);
    }

    Ok(SweInstance { s, patterns, domains })
}

/// Read OIT (1-in-3-SAT) clauses from `path`, one clause file, `#`-separated
/// on a single line, each clause a comma-separated triple of signed
/// integers (sign encodes negation, magnitude the variable id).
pub fn read_oit_file(path: impl AsRef<Path>) -> Result<Vec<Clause>, ReadError> {
    let text = std::fs::read_to_string(path)?;
    read_oit_str(&text)
}

pub fn read_oit_str(text: &str) -> Result<Vec<Clause>, ReadError> {
    let line = text.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    line.split('#')
        .map(|clause_text| {
            let literals: Vec<i64> = clause_text
                .split(',')
                .map(|literal| {
                    let literal = literal.trim();
                    if !LITERAL.is_match(literal) {
                        return Err(ReadError::MalformedLiteral(literal.to_string()));
                    }
                    literal.parse::<i64>().map_err(|_| ReadError::MalformedLiteral(literal.to_string()))
                })
                .collect::<Result<_, _>>()?;

            if literals.len() != 3 {
                return Err(ReadError::MalformedClause(clause_text.to_string()));
            }

            Ok(Clause::from_signed_literals(&literals))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_swe_instance() {
        let text = "1\nhelloworld\nhX\nX:ello,eap\n";
        let instance = parse_swe(text).unwrap();
        assert_eq!(instance.s, "helloworld");
        assert_eq!(instance.patterns, vec!["hX".to_string()]);
        assert_eq!(instance.domains.get(&'X').unwrap(), &vec!["ello".to_string(), "eap".to_string()]);
    }

    #[test]
    fn parses_an_instance_with_no_patterns_or_domains() {
        let text = "0\nabc\n";
        let instance = parse_swe(text).unwrap();
        assert_eq!(instance.s, "abc");
        assert!(instance.patterns.is_empty());
        assert!(instance.domains.is_empty());
    }

    #[test]
    fn rejects_a_non_integer_header() {
        let err = parse_swe("not-a-number\nabc\n").unwrap_err();
        assert!(matches!(err, ReadError::InvalidHeader(_)));
    }

    #[test]
    fn rejects_truncated_pattern_section() {
        let err = parse_swe("2\nabc\nonly-one-pattern\n").unwrap_err();
        assert!(matches!(err, ReadError::UnexpectedEof { .. }));
    }

    #[test]
    fn rejects_a_malformed_domain_line() {
        let err = parse_swe("0\nabc\nnot-a-domain-line\n").unwrap_err();
        assert!(matches!(err, ReadError::MalformedDomainLine(_)));
    }

    #[test]
    fn parses_oit_clauses_from_signed_literal_triples() {
        let clauses = read_oit_str("1,-2,3#-1,2,-3").unwrap();
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn rejects_an_oit_clause_without_exactly_three_literals() {
        let err = read_oit_str("1,-2").unwrap_err();
        assert!(matches!(err, ReadError::MalformedClause(_)));
    }

    #[test]
    fn rejects_a_non_integer_oit_literal() {
        let err = read_oit_str("1,x,3").unwrap_err();
        assert!(matches!(err, ReadError::MalformedLiteral(_)));
    }
}
