mod debug_report;

use std::io::{self, IsTerminal};
use std::time::Duration;

use swe_solver::io::{preprocess, read_oit_file, read_swe_file, read_swe_stdin, Translator};
use swe_solver::{CancellationToken, SolveOptions, Solver};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    match run(&config) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

struct CliConfig {
    input: InputSource,
    format: Format,
    preprocess: bool,
    memo_cap: Option<usize>,
    timeout: Option<Duration>,
    color: bool,
}

enum InputSource {
    File(String),
    Stdin,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Format {
    Swe,
    Oit,
}

fn run(config: &CliConfig) -> Result<(), String> {
    let mut instance = match (config.format, &config.input) {
        (Format::Swe, InputSource::File(path)) => read_swe_file(path).map_err(|e| e.to_string())?,
        (Format::Swe, InputSource::Stdin) => read_swe_stdin().map_err(|e| e.to_string())?,
        (Format::Oit, InputSource::File(path)) => {
            let clauses = read_oit_file(path).map_err(|e| e.to_string())?;
            let (s, patterns, domains) = Translator::new().to_swe(&clauses).map_err(|e| e.to_string())?;
            swe_solver::io::SweInstance { s, patterns, domains }
        }
        (Format::Oit, InputSource::Stdin) => return Err("--format oit requires --input, reading clauses from stdin is not supported".to_string()),
    };

    if config.preprocess {
        preprocess(&mut instance);
    }

    let s = instance.s.clone();
    let patterns = instance.patterns.clone();
    let mut solver = Solver::new(instance.s, instance.patterns, instance.domains).map_err(|e| e.to_string())?;

    let cancellation = config.timeout.map(|timeout| {
        let token = CancellationToken::new();
        let timer_token = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            timer_token.cancel();
        });
        token
    });
    let options = SolveOptions { memo_cap: config.memo_cap, cancellation };
    let solution = solver.solve_with(&options);

    let domain_sizes: Vec<usize> = solver.variables().iter().map(|&v| solver.domain(v).map_or(0, |d| d.len())).collect();
    debug_report::print_run(solution.as_ref(), &s, &patterns, solver.stats(), &domain_sizes, config.color);
    Ok(())
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<InputSource> = None;
    let mut format = Format::Swe;
    let mut preprocess = false;
    let mut memo_cap: Option<usize> = None;
    let mut timeout: Option<Duration> = None;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("swe-solver {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--preprocess" => preprocess = true,
            "--format" => {
                let value = args.next().ok_or_else(|| "error: --format expects a value".to_string())?;
                format = parse_format(&value)?;
            }
            "--memo-cap" => {
                let value = args.next().ok_or_else(|| "error: --memo-cap expects a value".to_string())?;
                memo_cap = Some(value.parse().map_err(|_| format!("error: invalid --memo-cap '{value}'"))?);
            }
            "--timeout-ms" => {
                let value = args.next().ok_or_else(|| "error: --timeout-ms expects a value".to_string())?;
                let millis: u64 = value.parse().map_err(|_| format!("error: invalid --timeout-ms '{value}'"))?;
                timeout = Some(Duration::from_millis(millis));
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(InputSource::File(value));
            }
            _ if arg.starts_with("--format=") => {
                format = parse_format(arg.trim_start_matches("--format="))?;
            }
            _ if arg.starts_with("--memo-cap=") => {
                let value = arg.trim_start_matches("--memo-cap=");
                memo_cap = Some(value.parse().map_err(|_| format!("error: invalid --memo-cap '{value}'"))?);
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(InputSource::File(value.to_string()));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(InputSource::File(arg));
            }
        }
    }

    let input = input.unwrap_or(InputSource::Stdin);

    Ok(CliConfig { input, format, preprocess, memo_cap, timeout, color })
}

fn parse_format(value: &str) -> Result<Format, String> {
    match value {
        "swe" => Ok(Format::Swe),
        "oit" => Ok(Format::Oit),
        other => Err(format!("error: invalid --format '{other}' (expected 'swe' or 'oit')")),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "swe-solver {version}

Substring-With-Expansions constraint solver CLI.

Usage:
  swe-solver [OPTIONS] [FILE]
  swe-solver [OPTIONS] --input <path>
  swe-solver [OPTIONS] < instance.swe

Options:
  -i, --input <path>       Instance file to read. If omitted, reads stdin.
  --format <swe|oit>        Input format. 'oit' runs the 1-in-3-SAT reduction
                            first. Default: swe.
  --preprocess              Shrink patterns/domains before solving.
  --memo-cap <n>            Cap the feasibility memo to the last n entries.
  --timeout-ms <n>          Abort the search after n milliseconds, reporting
                            whatever statistics were gathered so far.
  --color                   Force ANSI color output.
  --no-color                Disable ANSI color output.
  -h, --help                Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success (a solution was found, or printed as unsatisfiable).
  1  Internal error (malformed input, invalid instance).
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
