//! Wires the channels together, spawns the workers and stats collector, runs
//! the dispatcher, and drives the shutdown sequence in the order the core
//! spec requires.

use tracing::info;

use crate::cli::Args;
use crate::clock::Clock;
use crate::dispatcher;
use crate::error::Result;
use crate::params::ParamsReader;
use crate::stats::{self, StatsState};
use crate::worker::WorkerPool;

/// Runs the whole pipeline end to end and returns the stats collector's
/// final state (mainly so integration tests can assert on it without
/// scraping stdout).
#[expect(clippy::print_stdout, reason = "the overall-time line is this tool's primary output")]
pub fn run(args: Args) -> Result<StatsState> {
    let (output_tx, output_rx) = crossbeam_channel::unbounded();
    let stats_handle = stats::spawn(output_rx);

    let pool = WorkerPool::spawn(args.worker_count, &args.db_file, output_tx.clone())?;

    let records = match &args.params_file {
        Some(path) => ParamsReader::from_path(path)?,
        None => ParamsReader::from_stdin(),
    }
    .into_records();

    let clock = Clock::start();
    info!(workers = args.worker_count, "dispatching");
    let dispatched = dispatcher::run(records, &pool)?;

    // Shutdown, strict order (§4.6):
    //   a. close every worker input (pool.shutdown drops them)
    //   b. wait for all workers to exit (pool.shutdown joins them)
    //   c. print the overall time
    //   d. close the output channel
    //   e. wait for the stats collector
    //
    // `run` holds its own clone of `output_tx` for exactly this reason: each
    // worker's clone drops when that worker exits, but the stats collector
    // must stay blocked in its read loop until *this* clone also drops, so
    // the overall-time line (c) is guaranteed to print before the summary
    // (e) rather than racing it on stdout.
    pool.shutdown();
    let overall_ms = clock.now_ms();
    println!("The overall query time: {overall_ms} (ms)");
    drop(output_tx);

    let state = stats_handle.join().expect("stats thread should not panic");

    info!(dispatched, "done");
    Ok(state)
}
