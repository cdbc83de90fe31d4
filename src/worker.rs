//! The worker pool: N long-lived OS threads, each owning one SQLite
//! connection and one prepared statement, fed by a dedicated rendezvous
//! channel and reporting through a channel shared by the whole pool.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::db::{QDuration, QueryExecutor};
use crate::error::{Error, Result};
use crate::params::Record;

/// A live pool of workers plus their per-worker input channels. Dropping a
/// pool without calling [`WorkerPool::shutdown`] is still safe — closing the
/// senders unblocks every worker thread — but `shutdown` is what joins them
/// and should always be called explicitly so the orchestrator can order it
/// relative to the output channel close (I2).
pub struct WorkerPool {
    inputs: Vec<Sender<Record>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` workers, each opening its own connection to
    /// `db_path` and preparing the fixed query template.
    ///
    /// A worker that fails to open its connection or prepare its statement
    /// reports the failure back over a dedicated "ready" channel instead of
    /// silently returning — per the core's resolved open question, that
    /// failure is treated as fatal to the whole pipeline rather than a
    /// worker that quietly never consumes input (which would deadlock the
    /// dispatcher). On any such failure, every input channel is closed so
    /// the workers that *did* start up cleanly also unwind, and the pool
    /// reports the first failure to the caller.
    pub fn spawn(worker_count: usize, db_path: &Path, output: Sender<QDuration>) -> Result<Self> {
        let mut inputs = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(worker_count);

        for id in 0..worker_count {
            let (input_tx, input_rx) = crossbeam_channel::bounded(0);
            let output = output.clone();
            let ready_tx = ready_tx.clone();
            let db_path = db_path.to_path_buf();

            let handle = thread::Builder::new()
                .name(format!("qtool-worker-{id}"))
                .spawn(move || worker_main(id, &db_path, &input_rx, &output, &ready_tx))
                .map_err(Error::Io)?;

            inputs.push(input_tx);
            handles.push(handle);
        }
        drop(ready_tx);

        let mut failure = None;
        for _ in 0..worker_count {
            match ready_rx.recv() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failure.get_or_insert(err),
                Err(_) => break,
            };
        }

        if let Some(err) = failure {
            drop(inputs);
            for handle in handles {
                let _ = handle.join();
            }
            return Err(err);
        }

        Ok(Self { inputs, handles })
    }

    pub fn worker_count(&self) -> usize {
        self.inputs.len()
    }

    /// Sends `record` to worker `worker`, blocking until that worker has
    /// taken it (the channel is a rendezvous, depth 0).
    pub fn send(&self, worker: usize, record: Record) -> Result<()> {
        self.inputs[worker].send(record).map_err(|_| Error::Dispatch { worker })
    }

    /// Closes every worker's input channel and waits for all workers to
    /// exit. Must be called before the orchestrator closes the shared
    /// output channel, so every `QDuration` a worker is mid-send on is
    /// still observed by the stats collector (I2).
    pub fn shutdown(self) {
        drop(self.inputs);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn worker_main(
    id: usize,
    db_path: &Path,
    input: &Receiver<Record>,
    output: &Sender<QDuration>,
    ready: &Sender<Result<()>>,
) {
    debug!(worker = id, "starting");

    let conn = match Connection::open(db_path) {
        Ok(conn) => conn,
        Err(source) => {
            let _ = ready.send(Err(Error::Db(source)));
            return;
        }
    };

    let mut executor = match QueryExecutor::prepare(&conn) {
        Ok(executor) => executor,
        Err(source) => {
            let _ = ready.send(Err(Error::WorkerPrepare { worker: id, source }));
            return;
        }
    };

    if ready.send(Ok(())).is_err() {
        return;
    }

    let clock = Clock::start();
    for record in input.iter() {
        let qdur = executor.run(&record, &clock);
        if !qdur.ok {
            warn!(worker = id, host = %record.host, "no rows returned");
        }
        if output.send(qdur).is_err() {
            error!(worker = id, "stats channel closed early, dropping remaining work");
            break;
        }
    }

    debug!(worker = id, "closed");
}
