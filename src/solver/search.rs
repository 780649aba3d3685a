//! Backtracking search.
//!
//! The operational core of the solver (see `SPEC_FULL.md` §4.4):
//!
//! ```text
//! initial candidate_starts (via Oracle::fits_at, depth 0)
//!         │
//!         ▼
//! choose unassigned var (MRV) ──┐
//!         │                     │ repeat until saturated / pruned
//!         ▼                     │
//! order domain values (least-constraining-first)
//!         │
//!         ▼
//! tentatively assign, forward-check (shrink candidate_starts)
//!         │
//!    empty set? ──yes──▶ prune, try next value
//!         │no
//!         ▼
//!    recurse ──▶ success: propagate assignment up
//!         │
//!    all values exhausted ──▶ backtrack
//! ```
//!
//! Every choice here is made deterministic on purpose (ascending variable
//! symbol, ascending lexicographic value, sorted candidate-start vectors) so
//! that two runs over the same instance produce identical statistics, not
//! just identical solutions.
//!
//! ## Debugging
//!
//! Set `SWE_DEBUG=1` to print per-node tracing (chosen variable, value order,
//! pruning decisions) to stderr.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::occurrence::OccurrenceIndex;
use super::oracle::Oracle;
use super::tokenizer::Token;
use super::PartialAssignment;

/// Per-pattern set of positions still feasible under the current partial
/// assignment. Kept as a sorted `Vec` (not a `HashSet`) so iteration order —
/// and therefore every statistic derived from it — is deterministic.
pub type CandidateStarts = Vec<Vec<usize>>;

/// A cooperative cancellation flag consulted at the top of every search
/// node. This is the only permitted suspension point in `solve` (see
/// `SPEC_FULL.md` §5) — setting it causes the in-progress `solve` to return
/// `None` with `elapsed_wall_time` still recorded accurately.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tuning knobs for a single `solve` call. Defaults match the distilled
/// spec's baseline behavior (no cap, no cancellation).
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Caps the feasibility memo; `None` means unbounded.
    pub memo_cap: Option<usize>,
    /// Cooperative cancellation token; checked at the top of each node.
    pub cancellation: Option<CancellationToken>,
}

/// Counters exposed after a `solve()` call (`SPEC_FULL.md` §4.4.4).
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub states_explored: u64,
    pub states_considered: u64,
    pub states_pruned: u64,
    pub backtracks: u64,
    pub solutions_found: u64,
    pub max_depth_reached: usize,
    pub initial_infeasible_patterns: usize,
    pub elapsed_wall_time: Duration,
}

impl Stats {
    /// Theoretical totals computed from domain sizes, independent of any
    /// actual run: `leaves = Π d_i`, `total_nodes = 1 + Σ_{j<=n} Π_{i<=j} d_i`.
    pub fn theoretical_totals(domain_sizes: &[usize]) -> (u128, u128) {
        let mut sizes = domain_sizes.to_vec();
        sizes.sort_unstable();

        let mut leaves: u128 = 1;
        for &d in &sizes {
            leaves *= d as u128;
        }

        let mut total_nodes: u128 = 1;
        let mut prefix: u128 = 1;
        for &d in &sizes {
            prefix *= d as u128;
            total_nodes += prefix;
        }

        (leaves, total_nodes)
    }
}

/// Compute the initial `candidate_starts` for every pattern: every position
/// `p` in `[0, |s|]` for which `fits_at(pattern_id, 0, p, ∅)` holds.
///
/// `occurrence_index` narrows which positions are even worth probing: a
/// pattern whose first token is a variable can only start where one of that
/// variable's candidate strings actually occurs in `s`. Patterns starting
/// with a literal, or with no tokens at all, still scan every position —
/// checking a single character is already as cheap as an index lookup.
pub fn initial_candidate_starts(
    oracle: &Oracle,
    occurrence_index: &OccurrenceIndex,
    patterns: &[Vec<Token>],
    domains: &HashMap<char, Vec<String>>,
    s_len: usize,
    debug: bool,
) -> CandidateStarts {
    let empty = PartialAssignment::new();
    patterns
        .iter()
        .enumerate()
        .map(|(pattern_id, tokens)| {
            let probe_positions = probe_positions(tokens.first(), occurrence_index, domains, s_len);
            let starts: Vec<usize> =
                probe_positions.into_iter().filter(|&p| oracle.fits_at(pattern_id, 0, p, &empty)).collect();
            if debug {
                eprintln!("[search:init] pattern={pattern_id} candidate_starts={}", starts.len());
            }
            starts
        })
        .collect()
}

fn probe_positions(
    first_token: Option<&Token>,
    occurrence_index: &OccurrenceIndex,
    domains: &HashMap<char, Vec<String>>,
    s_len: usize,
) -> Vec<usize> {
    match first_token {
        Some(Token::Var(x)) => {
            let mut positions: Vec<usize> = domains
                .get(x)
                .into_iter()
                .flatten()
                .flat_map(|value| occurrence_index.positions_of(value).unwrap_or(&[]).iter().copied())
                .collect();
            positions.sort_unstable();
            positions.dedup();
            positions
        }
        _ => (0..=s_len).collect(),
    }
}

/// Drives the recursive MRV + forward-checking search described above.
pub struct Search<'a> {
    oracle: &'a Oracle<'a>,
    variables: &'a [char],
    domains: &'a HashMap<char, Vec<String>>,
    pattern_count: usize,
    cancellation: Option<CancellationToken>,
    debug: bool,
    stats: Stats,
}

impl<'a> Search<'a> {
    pub fn new(
        oracle: &'a Oracle<'a>,
        variables: &'a [char],
        domains: &'a HashMap<char, Vec<String>>,
        pattern_count: usize,
        options: &SolveOptions,
    ) -> Self {
        Search {
            oracle,
            variables,
            domains,
            pattern_count,
            cancellation: options.cancellation.clone(),
            debug: std::env::var_os("SWE_DEBUG").is_some(),
            stats: Stats::default(),
        }
    }

    /// Run the search to completion (or until cancelled), recording the wall
    /// clock time in the returned stats regardless of outcome.
    pub fn run(mut self, candidate_starts: CandidateStarts) -> (Option<PartialAssignment>, Stats) {
        let started = Instant::now();

        let initial_infeasible = candidate_starts.iter().filter(|c| c.is_empty()).count();
        if initial_infeasible > 0 {
            self.stats.states_explored = 1;
            self.stats.backtracks = 1;
            self.stats.initial_infeasible_patterns = initial_infeasible;
            self.stats.elapsed_wall_time = started.elapsed();
            return (None, self.stats);
        }

        let assignment = PartialAssignment::new();
        let result = self.step(assignment, candidate_starts);
        self.stats.elapsed_wall_time = started.elapsed();
        (result, self.stats)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn step(&mut self, assignment: PartialAssignment, candidate_starts: CandidateStarts) -> Option<PartialAssignment> {
        if self.is_cancelled() {
            return None;
        }

        self.stats.states_explored += 1;
        let depth = assignment.len();
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);

        if depth == self.variables.len() {
            self.stats.solutions_found += 1;
            return Some(assignment);
        }

        let var = self.choose_variable(&assignment);
        let mut ordered_values: Vec<&str> = self.domains[&var].iter().map(String::as_str).collect();
        ordered_values.sort_by(|a, b| {
            let score_a = self.placement_score(var, a, &assignment, &candidate_starts);
            let score_b = self.placement_score(var, b, &assignment, &candidate_starts);
            score_a.cmp(&score_b).then_with(|| a.cmp(b))
        });

        if self.debug {
            eprintln!("[search:choose] depth={depth} var={var} domain_size={}", ordered_values.len());
        }

        for value in ordered_values {
            if self.is_cancelled() {
                return None;
            }
            self.stats.states_considered += 1;

            let mut next_assignment = assignment.clone();
            next_assignment.insert(var, Rc::from(value));

            match self.forward_check(&candidate_starts, &next_assignment) {
                Some(next_candidates) => {
                    if let Some(solution) = self.step(next_assignment, next_candidates) {
                        return Some(solution);
                    }
                }
                None => {
                    self.stats.states_pruned += 1;
                    if self.debug {
                        eprintln!("[search:prune] depth={depth} var={var} value=\"{value}\"");
                    }
                }
            }
        }

        self.stats.backtracks += 1;
        None
    }

    /// MRV: the unassigned variable with the smallest domain, ties broken by
    /// ascending symbol (guaranteed by `self.variables` already being sorted
    /// ascending and `min_by_key` keeping the first minimum it sees).
    fn choose_variable(&self, assignment: &PartialAssignment) -> char {
        self.variables
            .iter()
            .copied()
            .filter(|v| !assignment.contains_key(v))
            .min_by_key(|v| self.domains[v].len())
            .expect("step() only calls choose_variable while unassigned variables remain")
    }

    /// `score(X, r, α, C)`: `+∞` if any candidate set is already empty,
    /// otherwise the total count of still-feasible starts across all
    /// patterns once `X ↦ r` is tentatively added to `α`.
    fn placement_score(&self, var: char, value: &str, assignment: &PartialAssignment, candidate_starts: &CandidateStarts) -> u64 {
        if candidate_starts.iter().any(Vec::is_empty) {
            return u64::MAX;
        }
        let mut trial = assignment.clone();
        trial.insert(var, Rc::from(value));

        let mut score = 0u64;
        for (pattern_id, starts) in candidate_starts.iter().enumerate() {
            score += starts.iter().filter(|&&p| self.oracle.fits_at(pattern_id, 0, p, &trial)).count() as u64;
        }
        score
    }

    /// Intersect each pattern's candidate-start set with positions still
    /// feasible under `assignment`. Returns `None` (prune) if any pattern's
    /// set becomes empty.
    fn forward_check(&self, candidate_starts: &CandidateStarts, assignment: &PartialAssignment) -> Option<CandidateStarts> {
        let mut updated = Vec::with_capacity(self.pattern_count);
        for (pattern_id, starts) in candidate_starts.iter().enumerate() {
            let next: Vec<usize> =
                starts.iter().copied().filter(|&p| self.oracle.fits_at(pattern_id, 0, p, assignment)).collect();
            if next.is_empty() {
                return None;
            }
            updated.push(next);
        }
        Some(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::oracle::MemoCap;
    use crate::solver::tokenizer::tokenize;

    #[test]
    fn theoretical_totals_match_spec_example() {
        let (leaves, total_nodes) = Stats::theoretical_totals(&[2, 3, 4]);
        assert_eq!(leaves, 24);
        assert_eq!(total_nodes, 33);
    }

    #[test]
    fn cancellation_token_round_trips() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn unsatisfiable_instance_reports_initial_infeasibility() {
        let s: Vec<char> = "ab".chars().collect();
        let patterns = vec![tokenize("XY")];
        let domains = HashMap::from([('X', vec!["a".to_string()]), ('Y', vec!["c".to_string()])]);
        let oracle = Oracle::new(&s, &patterns, &domains, MemoCap(None));
        let variables: Vec<char> = vec!['X', 'Y'];
        let index = OccurrenceIndex::build(&s, domains.values().flatten().map(String::as_str));
        let candidate_starts = initial_candidate_starts(&oracle, &index, &patterns, &domains, s.len(), false);

        let search = Search::new(&oracle, &variables, &domains, patterns.len(), &SolveOptions::default());
        let (result, stats) = search.run(candidate_starts);
        assert!(result.is_none());
        assert!(stats.states_explored >= 1);
    }

    #[test]
    fn probe_positions_for_a_variable_led_pattern_use_the_occurrence_index() {
        let s: Vec<char> = "xabxaby".chars().collect();
        let domains = HashMap::from([('X', vec!["ab".to_string(), "abx".to_string()])]);
        let index = OccurrenceIndex::build(&s, domains.values().flatten().map(String::as_str));
        let positions = probe_positions(Some(&Token::Var('X')), &index, &domains, s.len());
        assert_eq!(positions, vec![1, 4]);
    }
}
