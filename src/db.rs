//! The database adapter.
//!
//! The core spec describes a connection-open, prepare, bind-text, step,
//! reset, finalize, close surface; `rusqlite` maps onto that surface almost
//! verbatim, so this module stays a thin wrapper rather than a hand-rolled
//! binding layer. Parameters are bound positionally (1, 2, 3), matching the
//! spec's explicit "bound in positional order" requirement, even though the
//! SQL text itself names them `:HOST`, `:START_TIME`, `:END_TIME`.

use rusqlite::Connection;

use crate::clock::Clock;
use crate::params::Record;

pub const QUERY_TEMPLATE: &str = "
SELECT STRFTIME('%Y-%m-%d %H:%M', TS) AS BUCKET,
       MAX(USAGE) AS MAX_CPU_USAGE,
       MIN(USAGE) AS MIN_CPU_USAGE
FROM CPU_USAGE
WHERE HOST = :HOST AND TS BETWEEN :START_TIME AND :END_TIME
GROUP BY BUCKET;
";

/// The measured outcome of running one query: how long it took, and whether
/// it returned at least one row. `duration_ms` is meaningful only when `ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QDuration {
    pub duration_ms: i64,
    pub ok: bool,
}

/// One worker's exclusive connection and prepared statement. Never shared;
/// dropping a `QueryExecutor` finalizes the statement and closes the
/// connection, in that order, for free via `rusqlite`'s own `Drop` impls.
pub struct QueryExecutor<'conn> {
    statement: rusqlite::Statement<'conn>,
}

impl<'conn> QueryExecutor<'conn> {
    pub fn prepare(conn: &'conn Connection) -> rusqlite::Result<Self> {
        let statement = conn.prepare(QUERY_TEMPLATE)?;
        Ok(Self { statement })
    }

    /// Resets the statement, binds `record`'s three fields as text, times a
    /// single step, and reports whether any row came back. Bind/reset
    /// failures and step failures both collapse to `ok = false`, per the
    /// core's no-retry, no-partial-result failure policy; only I/O-level
    /// connection failures are allowed to propagate as a hard error.
    pub fn run(&mut self, record: &Record, clock: &Clock) -> QDuration {
        self.statement.raw_bind_parameter(1, &record.host).ok();
        self.statement.raw_bind_parameter(2, &record.start_ts).ok();
        self.statement.raw_bind_parameter(3, &record.end_ts).ok();

        let t0 = clock.now_ms();
        let mut rows = self.statement.raw_query();
        let has_row = rows.next().map(|row| row.is_some()).unwrap_or(false);
        let duration_ms = clock.now_ms() - t0;

        // Drain any remaining rows so the statement is clean for the next
        // reset(); we only ever measure and count, never materialize rows.
        while rows.next().ok().flatten().is_some() {}

        QDuration { duration_ms, ok: has_row }
    }
}
