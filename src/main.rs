//! CLI for the counter exercise.
//!
//! Run with: cargo run -- 100
//! Bounded wait: cargo run -- 100 --timeout-ms 5000

use std::env;
use std::process;
use std::time::Duration;

use colored::Colorize;
use tally::{Runner, TallyError};

// The source exercise runs 100 workers.
const DEFAULT_WORKERS: usize = 100;

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<(usize, Option<Duration>), TallyError> {
    let mut workers = DEFAULT_WORKERS;
    let mut timeout = None;
    let mut saw_workers = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--timeout-ms" => {
                let value = args
                    .next()
                    .ok_or_else(|| TallyError::InvalidArgs("--timeout-ms needs a value".into()))?;
                let ms: u64 = value
                    .parse()
                    .map_err(|_| TallyError::InvalidArgs(format!("invalid timeout: {value}")))?;
                timeout = Some(Duration::from_millis(ms));
            }
            other if !saw_workers => {
                workers = other.parse().map_err(|_| {
                    TallyError::InvalidArgs(format!("invalid worker count: {other}"))
                })?;
                saw_workers = true;
            }
            other => {
                return Err(TallyError::InvalidArgs(format!(
                    "unexpected argument: {other}"
                )));
            }
        }
    }

    Ok((workers, timeout))
}

fn main() {
    let (workers, timeout) = match parse_args(env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            eprintln!("usage: tally [WORKERS] [--timeout-ms MS]");
            process::exit(2);
        }
    };

    let mut runner = Runner::new(workers);
    if let Some(timeout) = timeout {
        runner = runner.wait_timeout(timeout);
    }

    match runner.run() {
        Ok(report) => {
            eprintln!(
                "{} {} worker(s) finished in {:.2?}",
                "ok:".green().bold(),
                report.workers,
                report.elapsed
            );
            println!("{}", report.final_count);
        }
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn defaults_match_the_source_exercise() {
        let (workers, timeout) = parse_args(args(&[])).unwrap();
        assert_eq!(workers, DEFAULT_WORKERS);
        assert!(timeout.is_none());
    }

    #[test]
    fn parses_worker_count_and_timeout() {
        let (workers, timeout) = parse_args(args(&["250", "--timeout-ms", "1500"])).unwrap();
        assert_eq!(workers, 250);
        assert_eq!(timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_args(args(&["not-a-number"])).is_err());
        assert!(parse_args(args(&["--timeout-ms"])).is_err());
        assert!(parse_args(args(&["1", "2"])).is_err());
    }
}
