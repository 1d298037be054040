//! Human review queue entries.

use std::fmt;

use chrono::{DateTime, Utc};
use intent_primitives::{QueueId, RecordId};
use serde::{Deserialize, Serialize};

/// Priority of a queued review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPriority {
    /// The verdict carried a policy violation.
    Urgent,
    /// High-value trade or weak reasoning.
    High,
    /// Everything else.
    Normal,
    /// Reserved for callers that enqueue manually.
    Low,
}

impl ReviewPriority {
    /// Ordering score; higher is reviewed first.
    #[must_use]
    pub const fn score(self) -> u8 {
        match self {
            Self::Urgent => 100,
            Self::High => 75,
            Self::Normal => 50,
            Self::Low => 25,
        }
    }
}

impl fmt::Display for ReviewPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        })
    }
}

/// Lifecycle status of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Waiting for a reviewer.
    Queued,
    /// A human decision was recorded.
    Completed,
}

/// One pending or completed human review task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQueueEntry {
    /// Queue identifier.
    pub queue_id: QueueId,
    /// Record under review.
    pub record_id: RecordId,
    /// Priority level.
    pub priority: ReviewPriority,
    /// Ordering score derived from the priority.
    pub priority_score: u8,
    /// Reviewer the entry is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Queue status.
    pub status: ReviewStatus,
    /// When the entry was enqueued.
    pub created_at: DateTime<Utc>,
    /// When the review was completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReviewQueueEntry {
    /// Creates a queued entry for `record_id`.
    #[must_use]
    pub fn new(record_id: RecordId, priority: ReviewPriority) -> Self {
        Self {
            queue_id: QueueId::random(),
            record_id,
            priority,
            priority_score: priority.score(),
            assignee: None,
            status: ReviewStatus::Queued,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Returns `true` while the entry awaits a reviewer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ReviewStatus::Queued
    }

    /// Marks the entry completed.
    pub fn complete(&mut self) {
        self.status = ReviewStatus::Completed;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_strictly_ordered() {
        let scores: Vec<u8> = [
            ReviewPriority::Urgent,
            ReviewPriority::High,
            ReviewPriority::Normal,
            ReviewPriority::Low,
        ]
        .into_iter()
        .map(ReviewPriority::score)
        .collect();
        assert_eq!(scores, [100, 75, 50, 25]);
    }

    #[test]
    fn completion_sets_timestamp() {
        let mut entry = ReviewQueueEntry::new(RecordId::random(), ReviewPriority::High);
        assert!(entry.is_pending());
        assert_eq!(entry.priority_score, 75);

        entry.complete();
        assert!(!entry.is_pending());
        assert!(entry.completed_at.is_some());
    }
}
