//! Instance shrinking.
//!
//! Advisory only: every transformation here is meant to preserve
//! solvability equivalence (a solution exists for the shrunk instance iff
//! one exists for the original), and the solver never depends on having
//! run through this first. Mirrors the reference implementation's own
//! `cleanup_t_strings`/`cleanup_R_sets` pass, with one deliberate
//! divergence noted below.

use std::collections::HashSet;

use super::SweInstance;

/// Shrink `instance.patterns` and `instance.domains` in place.
///
/// - Drop exact-duplicate patterns.
/// - Drop a pattern that is a proper substring of another retained pattern
///   *unless* it is the only remaining pattern referencing one of its
///   variables — losing that reference would make construction reject the
///   variable's domain as unreferenced, silently changing the instance
///   rather than just shrinking it. The reference implementation drops
///   these unconditionally; doing so here first.
/// - Drop domain entries for variables no pattern references any more.
/// - Drop candidate strings that cannot occur in `s` at all.
pub fn preprocess(instance: &mut SweInstance) {
    dedupe_patterns(&mut instance.patterns);
    drop_substring_patterns(instance);
    drop_unreferenced_domains(instance);
    drop_impossible_candidates(instance);
}

fn dedupe_patterns(patterns: &mut Vec<String>) {
    let mut seen = HashSet::new();
    patterns.retain(|p| seen.insert(p.clone()));
}

fn pattern_variables(pattern: &str) -> HashSet<char> {
    pattern.chars().filter(char::is_ascii_uppercase).collect()
}

fn drop_substring_patterns(instance: &mut SweInstance) {
    let patterns = &instance.patterns;
    let mut keep = vec![true; patterns.len()];

    for (i, p_i) in patterns.iter().enumerate() {
        let is_substring_of_another =
            patterns.iter().enumerate().any(|(j, p_j)| i != j && p_j.contains(p_i.as_str()) && p_i != p_j);
        if !is_substring_of_another {
            continue;
        }

        // Would dropping p_i strand one of its variables (make it
        // unreferenced by any *other* retained pattern)? If so, keep it.
        let vars = pattern_variables(p_i);
        let stranded = vars.iter().any(|&var| {
            !patterns.iter().enumerate().any(|(j, p_j)| j != i && pattern_variables(p_j).contains(&var))
        });
        keep[i] = stranded;
    }

    let mut kept = Vec::with_capacity(patterns.len());
    for (pattern, keep) in instance.patterns.drain(..).zip(keep) {
        if keep {
            kept.push(pattern);
        }
    }
    instance.patterns = kept;
}

fn drop_unreferenced_domains(instance: &mut SweInstance) {
    let referenced: HashSet<char> = instance.patterns.iter().flat_map(|p| pattern_variables(p)).collect();
    instance.domains.retain(|var, _| referenced.contains(var));
}

fn drop_impossible_candidates(instance: &mut SweInstance) {
    let s = &instance.s;
    for values in instance.domains.values_mut() {
        values.retain(|v| s.contains(v.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(s: &str, patterns: &[&str], domains: &[(char, &[&str])]) -> SweInstance {
        SweInstance {
            s: s.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            domains: domains.iter().map(|&(v, vals)| (v, vals.iter().map(|s| s.to_string()).collect())).collect(),
        }
    }

    #[test]
    fn drops_exact_duplicate_patterns() {
        let mut inst = instance("abc", &["aX", "aX", "b"], &[('X', &["b", "c"])]);
        preprocess(&mut inst);
        assert_eq!(inst.patterns, vec!["aX".to_string(), "b".to_string()]);
    }

    #[test]
    fn drops_a_pattern_that_is_a_proper_substring_of_another() {
        let mut inst = instance("abc", &["ab", "abc"], &[]);
        preprocess(&mut inst);
        assert_eq!(inst.patterns, vec!["abc".to_string()]);
    }

    #[test]
    fn keeps_a_substring_pattern_whose_variable_would_otherwise_be_stranded() {
        let mut inst = instance("abc", &["aX", "aXc"], &[('X', &["b"])]);
        preprocess(&mut inst);
        assert_eq!(inst.patterns.len(), 2);
    }

    #[test]
    fn drops_domain_entries_for_variables_no_pattern_references() {
        let mut inst = instance("abc", &["a"], &[('X', &["b"])]);
        preprocess(&mut inst);
        assert!(inst.domains.is_empty());
    }

    #[test]
    fn drops_candidate_strings_that_cannot_occur_in_s() {
        let mut inst = instance("abc", &["X"], &[('X', &["b", "zzz"])]);
        preprocess(&mut inst);
        assert_eq!(inst.domains.get(&'X').unwrap(), &vec!["b".to_string()]);
    }
}
