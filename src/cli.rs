//! Commandline arguments.

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use crate::error::{Error, Result};

const MIN_WORKERS: u32 = 1;
const MAX_WORKERS: u32 = 16;
const DEFAULT_WORKERS: i64 = 4;

/// Benchmarks a fixed per-host time-series aggregation query against SQLite
/// by streaming query-parameter records through a pool of concurrent
/// workers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file to query
    pub db_file: PathBuf,

    /// Params file to read (host,start_ts,end_ts per line); reads stdin when omitted
    pub params_file: Option<PathBuf>,

    /// Number of concurrent workers, in [1, 16]
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: i64,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Resolved, validated arguments. Separate from [`Cli`] because the
/// worker-count clamp needs to emit a `tracing::warn!`, which `clap`'s own
/// validators can't do — they can only accept or reject.
pub struct Args {
    pub db_file: PathBuf,
    pub params_file: Option<PathBuf>,
    pub worker_count: usize,
    pub verbosity: u8,
}

impl Cli {
    /// Validates and clamps the raw CLI input.
    ///
    /// Out-of-range-above clamps to 16 with a warning; anything at or below
    /// zero is a fatal argument error (unparsable values are already
    /// rejected by `clap` before this runs, since `workers` is typed `i64`).
    pub fn resolve(self) -> Result<Args> {
        if self.workers <= 0 {
            return Err(Error::Args(format!(
                "the number of workers must be greater than 0: '{}'",
                self.workers
            )));
        }

        let worker_count = if self.workers > i64::from(MAX_WORKERS) {
            warn!(
                requested = self.workers,
                clamped_to = MAX_WORKERS,
                "the number of workers specified is greater than allowed maximum"
            );
            MAX_WORKERS
        } else {
            // SAFETY-free: bounds already checked above (0 < workers <= MAX_WORKERS fits u32)
            self.workers as u32
        };
        debug_assert!(worker_count >= MIN_WORKERS);

        Ok(Args {
            db_file: self.db_file,
            params_file: self.params_file,
            worker_count: worker_count as usize,
            verbosity: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(workers: i64) -> Cli {
        Cli { db_file: PathBuf::from("db.sqlite"), params_file: None, workers, verbose: 0 }
    }

    #[test]
    fn default_in_range_passes_through() {
        let args = cli(4).resolve().expect("4 workers should be valid");
        assert_eq!(args.worker_count, 4);
    }

    #[test]
    fn clamps_above_max_with_warning() {
        let args = cli(99).resolve().expect("should clamp rather than fail");
        assert_eq!(args.worker_count, 16);
    }

    #[test]
    fn zero_is_fatal() {
        assert!(cli(0).resolve().is_err());
    }

    #[test]
    fn negative_is_fatal() {
        assert!(cli(-3).resolve().is_err());
    }

    #[test]
    fn exactly_max_is_not_clamped() {
        let args = cli(16).resolve().expect("16 is in range");
        assert_eq!(args.worker_count, 16);
    }
}
