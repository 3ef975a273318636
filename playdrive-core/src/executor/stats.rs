use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-host counters aggregated by the engine over a whole run.
///
/// Keys are host names in whatever order the engine produced them; the
/// result reduction sorts and de-duplicates before reporting.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    pub ok: IndexMap<String, u64>,
    pub failures: IndexMap<String, u64>,
    /// Hosts the engine could not reach.
    pub dark: IndexMap<String, u64>,
    pub changed: IndexMap<String, u64>,
    pub skipped: IndexMap<String, u64>,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_ok(&mut self, host: &str) {
        *self.ok.entry(host.to_string()).or_insert(0) += 1;
    }

    pub fn increment_failed(&mut self, host: &str) {
        *self.failures.entry(host.to_string()).or_insert(0) += 1;
    }

    pub fn increment_dark(&mut self, host: &str) {
        *self.dark.entry(host.to_string()).or_insert(0) += 1;
    }

    pub fn increment_changed(&mut self, host: &str) {
        *self.changed.entry(host.to_string()).or_insert(0) += 1;
    }

    pub fn increment_skipped(&mut self, host: &str) {
        *self.skipped.entry(host.to_string()).or_insert(0) += 1;
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.dark.is_empty()
    }
}
