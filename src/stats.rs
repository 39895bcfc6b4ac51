// Run statistics

use std::fmt;

/// Counters for one run. Created at the start, threaded through the
/// orchestrator, reported at the end; never persisted across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Files freshly encoded this run
    pub processed: u64,

    /// Files whose encode exited non-zero (and were quarantined)
    pub failed: u64,

    /// Files skipped: probe failures or already-valid outputs
    pub skipped: u64,
}

impl RunStats {
    pub fn total(&self) -> u64 {
        self.processed + self.failed + self.skipped
    }

    /// The final summary line.
    pub fn summary(&self) -> String {
        format!(
            "summary: processed={}, failed={}, skipped={}",
            self.processed, self.failed, self.skipped
        )
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
