//! Per-item outcomes and their run-level tally.

use pricedb_db::ScrapeRunCounts;

/// Final state of one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The primary entity did not exist before this item.
    Created { logs_appended: u32 },
    /// The primary entity existed and was refreshed.
    Updated { logs_appended: u32 },
    /// An identifying or mandatory field was missing. Never retried.
    SkippedMissingData { reason: String },
    /// Fetch retries were exhausted, the payload could not be fetched, or
    /// the record's transaction was rolled back.
    FailedPermanent { reason: String },
}

impl ItemOutcome {
    #[must_use]
    pub fn logs_appended(&self) -> u32 {
        match self {
            ItemOutcome::Created { logs_appended } | ItemOutcome::Updated { logs_appended } => {
                *logs_appended
            }
            ItemOutcome::SkippedMissingData { .. } | ItemOutcome::FailedPermanent { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub items_enqueued: u32,
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
    pub logs_appended: u32,
    /// Set when a list page could not be fetched and paging stopped early.
    pub list_error: Option<String>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Created { .. } => self.created += 1,
            ItemOutcome::Updated { .. } => self.updated += 1,
            ItemOutcome::SkippedMissingData { .. } => self.skipped += 1,
            ItemOutcome::FailedPermanent { .. } => self.failed += 1,
        }
        self.logs_appended += outcome.logs_appended();
    }

    /// Folds a worker's item counts into this summary. List-phase fields are
    /// owned by the runner and left untouched.
    pub fn merge_items(&mut self, other: &RunSummary) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.logs_appended += other.logs_appended;
    }

    /// Items that reached a final state.
    #[must_use]
    pub fn items_processed(&self) -> u32 {
        self.created + self.updated + self.skipped + self.failed
    }

    #[must_use]
    pub fn to_counts(&self) -> ScrapeRunCounts {
        let clamp = |n: u32| i32::try_from(n).unwrap_or(i32::MAX);
        ScrapeRunCounts {
            pages_fetched: clamp(self.pages_fetched),
            items_enqueued: clamp(self.items_enqueued),
            items_created: clamp(self.created),
            items_updated: clamp(self.updated),
            items_skipped: clamp(self.skipped),
            items_failed: clamp(self.failed),
            logs_appended: clamp(self.logs_appended),
        }
    }
}
