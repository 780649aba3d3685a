use swe_solver::{expand, Assignment, Stats};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(solution: Option<&Assignment>, s: &str, patterns: &[String], stats: &Stats, domain_sizes: &[usize], color: bool) {
    let palette = ansi::Palette::new(color);

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match solution {
        Some(assignment) => {
            print_assignment(assignment, &palette);
            println!();
            print_pattern_matches(patterns, s, assignment, &palette);
        }
        None => {
            println!("{}", palette.bold(palette.paint("No solution", ansi::RED)));
            if stats.initial_infeasible_patterns > 0 {
                println!(
                    "  {} {} pattern(s) had no feasible start position before any variable was assigned",
                    palette.dim("note:"),
                    palette.paint(stats.initial_infeasible_patterns.to_string(), ansi::YELLOW),
                );
            }
        }
    }

    println!("\n{}", palette.paint("━━━ Statistics ━━━", ansi::GRAY));
    print_stats(stats, domain_sizes, &palette);
    println!();
}

fn print_assignment(assignment: &Assignment, palette: &ansi::Palette) {
    if assignment.is_empty() {
        println!("{}", palette.dim("  (no variables to assign)"));
        return;
    }
    for (var, value) in assignment.iter() {
        println!("  {} {} {}", palette.bold(palette.paint(var.to_string(), ansi::GREEN)), palette.dim("-->"), palette.paint(value, ansi::CYAN));
    }
}

/// Per-pattern confirmation: for each pattern, its expansion under the
/// solution and where that expansion was found in `s`, with the match
/// highlighted — the CLI equivalent of the original's
/// `Problem.evaluate_assignment` confirmation pass.
fn print_pattern_matches(patterns: &[String], s: &str, assignment: &Assignment, palette: &ansi::Palette) {
    for pattern in patterns {
        let expanded = expand(pattern, assignment);
        match s.find(&expanded) {
            Some(index) => {
                println!(
                    "  {} {} {} {} {}",
                    palette.paint(pattern, ansi::CYAN),
                    palette.dim("-->"),
                    expanded,
                    palette.dim("found at index"),
                    palette.paint(index.to_string(), ansi::BLUE),
                );
                let end = index + expanded.len();
                println!("    {}{}{}", &s[..index], palette.paint(&s[index..end], ansi::GREEN), &s[end..]);
            }
            None => {
                println!(
                    "  {} {} {} {}",
                    palette.paint(pattern, ansi::CYAN),
                    palette.dim("-->"),
                    expanded,
                    palette.paint("is not a substring of s", ansi::RED),
                );
            }
        }
    }
}

fn print_stats(stats: &Stats, domain_sizes: &[usize], palette: &ansi::Palette) {
    println!(
        "  {} {}  {} {}  {} {}",
        palette.dim("explored:"),
        palette.paint(stats.states_explored.to_string(), ansi::BLUE),
        palette.dim("considered:"),
        palette.paint(stats.states_considered.to_string(), ansi::BLUE),
        palette.dim("pruned:"),
        palette.paint(stats.states_pruned.to_string(), ansi::YELLOW),
    );
    println!(
        "  {} {}  {} {}  {} {}",
        palette.dim("backtracks:"),
        palette.paint(stats.backtracks.to_string(), ansi::YELLOW),
        palette.dim("solutions found:"),
        palette.paint(stats.solutions_found.to_string(), ansi::GREEN),
        palette.dim("max depth:"),
        palette.paint(stats.max_depth_reached.to_string(), ansi::BLUE),
    );
    println!("  {} {:?}", palette.dim("elapsed:"), stats.elapsed_wall_time);

    let (leaves, total_nodes) = Stats::theoretical_totals(domain_sizes);
    println!(
        "  {} {}  {} {}",
        palette.dim("total leaf assignments (theoretical):"),
        palette.paint(leaves.to_string(), ansi::GRAY),
        palette.dim("total tree nodes (theoretical):"),
        palette.paint(total_nodes.to_string(), ansi::GRAY),
    );
}
