//! Folds per-query outcomes into the summary counters and prints them.

use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::db::QDuration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsState {
    pub nq: u64,
    pub nq_ok: u64,
    pub total_ms: i64,
    pub min_ms: i64,
    pub max_ms: i64,
}

impl StatsState {
    fn new() -> Self {
        Self { nq: 0, nq_ok: 0, total_ms: 0, min_ms: i64::MAX, max_ms: 0 }
    }

    fn record(&mut self, qdur: QDuration) {
        self.nq += 1;
        if qdur.ok {
            self.nq_ok += 1;
            self.total_ms += qdur.duration_ms;
            self.min_ms = self.min_ms.min(qdur.duration_ms);
            self.max_ms = self.max_ms.max(qdur.duration_ms);
        }
    }

    /// Average query time, rounded toward zero, as integer division does.
    fn average_ms(&self) -> i64 {
        if self.nq_ok == 0 {
            0
        } else {
            self.total_ms / self.nq_ok as i64
        }
    }

    #[expect(clippy::print_stdout, reason = "the summary is this tool's primary output")]
    fn print_summary(&self) {
        println!("The number of queries processed: {}", self.nq);
        println!("The number of queries which returned some data: {}", self.nq_ok);
        if self.nq_ok == 0 {
            return;
        }
        println!("The sum of the single query times: {} (ms)", self.total_ms);
        println!("The minimum query time: {} (ms)", self.min_ms);
        println!("The maximum query time: {} (ms)", self.max_ms);
        println!("The average query time: {} (ms)", self.average_ms());
    }
}

/// Spawns the single stats-collecting thread. It runs until `input` is
/// closed (every worker has exited and the orchestrator has dropped its own
/// sender), at which point it prints the summary and returns.
pub fn spawn(input: Receiver<QDuration>) -> JoinHandle<StatsState> {
    thread::Builder::new()
        .name("qtool-stats".into())
        .spawn(move || {
            let mut state = StatsState::new();
            for qdur in input.iter() {
                state.record(qdur);
            }
            state.print_summary();
            state
        })
        .expect("spawning the stats thread should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conserves_total_count() {
        let mut state = StatsState::new();
        state.record(QDuration { duration_ms: 5, ok: true });
        state.record(QDuration { duration_ms: 0, ok: false });
        state.record(QDuration { duration_ms: 3, ok: true });
        assert_eq!(state.nq, 3);
        assert_eq!(state.nq_ok, 2);
        assert_eq!(state.total_ms, 8);
    }

    #[test]
    fn tracks_min_and_max_over_ok_outcomes_only() {
        let mut state = StatsState::new();
        state.record(QDuration { duration_ms: 100, ok: false });
        state.record(QDuration { duration_ms: 5, ok: true });
        state.record(QDuration { duration_ms: 9, ok: true });
        assert_eq!(state.min_ms, 5);
        assert_eq!(state.max_ms, 9);
    }

    #[test]
    fn no_ok_outcomes_leaves_min_untouched() {
        let mut state = StatsState::new();
        state.record(QDuration { duration_ms: 0, ok: false });
        assert_eq!(state.nq, 1);
        assert_eq!(state.nq_ok, 0);
        assert_eq!(state.average_ms(), 0);
    }

    #[test]
    fn average_rounds_toward_zero() {
        let mut state = StatsState::new();
        state.record(QDuration { duration_ms: 7, ok: true });
        state.record(QDuration { duration_ms: 7, ok: true });
        state.record(QDuration { duration_ms: 7, ok: true });
        assert_eq!(state.total_ms, 21);
        assert_eq!(state.average_ms(), 7);

        let mut state = StatsState::new();
        state.record(QDuration { duration_ms: 1, ok: true });
        state.record(QDuration { duration_ms: 1, ok: true });
        state.record(QDuration { duration_ms: 1, ok: true });
        // 3 / 3 = 1, but test integer rounding with an uneven total:
        state.record(QDuration { duration_ms: 1, ok: true });
        assert_eq!(state.total_ms, 4);
        assert_eq!(state.average_ms(), 1);
    }

    #[test]
    fn collects_from_channel_and_closes_cleanly() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = spawn(rx);
        tx.send(QDuration { duration_ms: 4, ok: true }).expect("send");
        tx.send(QDuration { duration_ms: 0, ok: false }).expect("send");
        drop(tx);
        let state = handle.join().expect("collector thread should not panic");
        assert_eq!(state.nq, 2);
        assert_eq!(state.nq_ok, 1);
    }
}
