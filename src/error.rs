use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Every fatal failure mode the pipeline can hit, in one place so `main` has
/// a single `Result` to report through `color_eyre` and a single exit code
/// mapping (0 success, anything else failure).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    Args(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read query parameters: {0}")]
    Csv(#[from] csv::Error),

    #[error("worker '{worker}' could not prepare its statement: {source}")]
    WorkerPrepare { worker: usize, source: rusqlite::Error },

    #[error("could not read record {record_index}: {source}")]
    Iterator { record_index: u64, source: csv::Error },

    #[error("could not send a record to worker '{worker}'")]
    Dispatch { worker: usize },
}
