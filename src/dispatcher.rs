//! Drains the params iterator and routes each record to a worker by the
//! stable hash of its host.

use tracing::instrument;

use crate::error::Result;
use crate::hash::worker_for_host;
use crate::params::RecordsIter;
use crate::worker::WorkerPool;

/// Runs the dispatch loop to completion. Returns the number of records
/// dispatched on success; any iterator error or worker-send failure aborts
/// immediately and is propagated to the caller, which aborts the whole
/// pipeline.
#[instrument(skip_all)]
pub fn run(records: RecordsIter, pool: &WorkerPool) -> Result<u64> {
    let worker_count = pool.worker_count();
    let mut dispatched = 0u64;

    for record in records {
        let record = record?;
        let worker = worker_for_host(record.host.as_bytes(), worker_count);
        pool.send(worker, record)?;
        dispatched += 1;
    }

    Ok(dispatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::QDuration;
    use rusqlite::Connection;

    fn seeded_db() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().expect("create temp db file");
        let conn = Connection::open(file.path()).expect("open");
        conn.execute_batch(
            "CREATE TABLE CPU_USAGE (HOST TEXT, TS TEXT, USAGE REAL);
             INSERT INTO CPU_USAGE VALUES ('hostA', '2017-01-01 08:30:00', 10.0);",
        )
        .expect("seed");
        file
    }

    fn records_iter(text: &str) -> RecordsIter {
        crate::params::ParamsReader::from_str_for_tests(text).into_records()
    }

    #[test]
    fn dispatches_every_record_exactly_once() {
        let db = seeded_db();
        let (output_tx, output_rx) = crossbeam_channel::unbounded::<QDuration>();
        let pool = WorkerPool::spawn(2, db.path(), output_tx).expect("spawn pool");

        let records = records_iter(
            "hostA,2017-01-01 08:00:00,2017-01-01 09:00:00\n\
             hostB,2017-01-01 08:00:00,2017-01-01 09:00:00\n\
             hostC,2017-01-01 08:00:00,2017-01-01 09:00:00\n",
        );
        let dispatched = run(records, &pool).expect("dispatch should succeed");
        assert_eq!(dispatched, 3);

        pool.shutdown();
        let received: Vec<_> = output_rx.try_iter().collect();
        assert_eq!(received.len(), 3);
    }

    #[test]
    fn propagates_iterator_errors() {
        let db = seeded_db();
        let (output_tx, _output_rx) = crossbeam_channel::unbounded::<QDuration>();
        let pool = WorkerPool::spawn(1, db.path(), output_tx).expect("spawn pool");

        let records = records_iter("hostA,only-two-fields\n");
        let result = run(records, &pool);
        assert!(result.is_err());
        pool.shutdown();
    }
}
