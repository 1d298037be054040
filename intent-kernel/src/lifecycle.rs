//! Lifecycle state machine for governed decisions.

use intent_primitives::RecordId;
use intent_reasoning::{ExecutionStatus, GovernanceDecision, ReasoningRecord};
use thiserror::Error;
use tracing::debug;

/// States a reasoning record moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionState {
    /// Reasoning extracted, policies not yet evaluated.
    Captured,
    /// Policy verdict merged into the record.
    GovernanceEvaluated,
    /// Cleared for execution.
    Approved,
    /// Blocked; final.
    Rejected,
    /// Waiting on a human decision.
    ReviewRequired,
    /// Cleared for execution with reviewer overrides.
    Modified,
    /// Execution started.
    Executing,
    /// Execution finished successfully; final.
    ExecutionCompleted,
    /// Execution finished with an error; final.
    ExecutionFailed,
}

impl DecisionState {
    /// Derives the state a stored record is in.
    #[must_use]
    pub fn of(record: &ReasoningRecord) -> Self {
        match record.execution().map(|outcome| outcome.status) {
            Some(ExecutionStatus::Executing) => return Self::Executing,
            Some(ExecutionStatus::Completed) => return Self::ExecutionCompleted,
            Some(ExecutionStatus::Failed) => return Self::ExecutionFailed,
            Some(ExecutionStatus::Pending) | None => {}
        }
        match record.governance_decision() {
            GovernanceDecision::Pending => Self::Captured,
            GovernanceDecision::Approved => Self::Approved,
            GovernanceDecision::Rejected => Self::Rejected,
            GovernanceDecision::ReviewRequired => Self::ReviewRequired,
            GovernanceDecision::Modified => Self::Modified,
        }
    }

    /// Returns `true` when the action may be executed.
    #[must_use]
    pub const fn permits_execution(self) -> bool {
        matches!(self, Self::Approved | Self::Modified)
    }

    /// Returns `true` once no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::ExecutionCompleted | Self::ExecutionFailed
        )
    }
}

/// Events that trigger lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The policy engine returned a verdict.
    Evaluate,
    /// The verdict's decision routes the record.
    Route(GovernanceDecision),
    /// The verdict flagged the record for human review.
    Escalate,
    /// A reviewer decided.
    Review(GovernanceDecision),
    /// The executor reported progress.
    Execute(ExecutionStatus),
}

/// Lifecycle controller for one record.
///
/// Approved and rejected records can still carry a review request; until a
/// reviewer answers it the record may not be executed.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    record_id: RecordId,
    state: DecisionState,
    review_outstanding: bool,
}

impl Lifecycle {
    /// Starts a lifecycle for a freshly captured record.
    #[must_use]
    pub const fn new(record_id: RecordId) -> Self {
        Self {
            record_id,
            state: DecisionState::Captured,
            review_outstanding: false,
        }
    }

    /// Resumes the lifecycle of a stored record.
    #[must_use]
    pub fn resume(record: &ReasoningRecord) -> Self {
        Self {
            record_id: record.id(),
            state: DecisionState::of(record),
            review_outstanding: record.requires_review() && record.review().is_none(),
        }
    }

    /// Returns the owning record identifier.
    #[must_use]
    pub const fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> DecisionState {
        self.state
    }

    /// Returns `true` while a requested human review is unanswered.
    #[must_use]
    pub const fn review_outstanding(&self) -> bool {
        self.review_outstanding
    }

    /// Applies a lifecycle event, returning the resulting state.
    ///
    /// # Errors
    ///
    /// * [`LifecycleError::ReviewOutstanding`] when execution is reported for
    ///   a cleared record whose review request is unanswered.
    /// * [`LifecycleError::InvalidTransition`] when the event is not allowed
    ///   from the current state.
    pub fn transition(&mut self, event: LifecycleEvent) -> LifecycleResult<DecisionState> {
        use DecisionState as S;
        use ExecutionStatus as X;
        use GovernanceDecision as G;

        if self.review_outstanding
            && self.state.permits_execution()
            && matches!(event, LifecycleEvent::Execute(_))
        {
            return Err(LifecycleError::ReviewOutstanding {
                record_id: self.record_id,
            });
        }

        // Approved or rejected records only accept a review while one is
        // outstanding; a rejection can be confirmed but never overturned.
        let flagged = self.review_outstanding;
        let next = match (self.state, event) {
            (S::Captured, LifecycleEvent::Evaluate) => Some(S::GovernanceEvaluated),
            (S::Approved | S::Rejected | S::ReviewRequired, LifecycleEvent::Escalate)
                if !flagged =>
            {
                Some(self.state)
            }
            (S::GovernanceEvaluated, LifecycleEvent::Route(G::Approved))
            | (S::ReviewRequired, LifecycleEvent::Review(G::Approved)) => Some(S::Approved),
            (S::Approved, LifecycleEvent::Review(G::Approved)) if flagged => Some(S::Approved),
            (S::GovernanceEvaluated, LifecycleEvent::Route(G::Rejected))
            | (S::ReviewRequired, LifecycleEvent::Review(G::Rejected)) => Some(S::Rejected),
            (S::Approved | S::Rejected, LifecycleEvent::Review(G::Rejected)) if flagged => {
                Some(S::Rejected)
            }
            (S::GovernanceEvaluated, LifecycleEvent::Route(G::ReviewRequired)) => {
                Some(S::ReviewRequired)
            }
            (S::ReviewRequired, LifecycleEvent::Review(G::Modified)) => Some(S::Modified),
            (S::Approved, LifecycleEvent::Review(G::Modified)) if flagged => Some(S::Modified),
            (S::Approved | S::Modified, LifecycleEvent::Execute(X::Executing)) => {
                Some(S::Executing)
            }
            (S::Approved | S::Modified | S::Executing, LifecycleEvent::Execute(X::Completed)) => {
                Some(S::ExecutionCompleted)
            }
            (S::Approved | S::Modified | S::Executing, LifecycleEvent::Execute(X::Failed)) => {
                Some(S::ExecutionFailed)
            }
            _ => None,
        };

        let Some(next_state) = next else {
            return Err(LifecycleError::InvalidTransition {
                record_id: self.record_id,
                from: self.state,
                event,
            });
        };

        debug!(
            record_id = %self.record_id,
            ?self.state,
            ?next_state,
            ?event,
            "decision lifecycle transition"
        );
        match event {
            LifecycleEvent::Escalate => self.review_outstanding = true,
            LifecycleEvent::Review(_) => self.review_outstanding = false,
            _ => {}
        }
        self.state = next_state;
        Ok(next_state)
    }
}

/// Errors emitted by the lifecycle controller.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Transition was not permitted from the current state.
    #[error("invalid lifecycle transition from {from:?} via {event:?} for record {record_id}")]
    InvalidTransition {
        /// Record whose transition failed.
        record_id: RecordId,
        /// State prior to the attempted transition.
        from: DecisionState,
        /// Event that triggered the failure.
        event: LifecycleEvent,
    },
    /// Execution was reported before the requested review was answered.
    #[error("record {record_id} has an unanswered review request")]
    ReviewOutstanding {
        /// Record awaiting its reviewer.
        record_id: RecordId,
    },
}

/// Result alias used for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
