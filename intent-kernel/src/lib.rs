//! Lifecycle orchestration for IntentCore.
//!
//! [`DecisionManager`] turns an agent conversation into a persisted,
//! governed [`ReasoningRecord`](intent_reasoning::ReasoningRecord): it runs the
//! extractor and the policy engine, queues records that need a human, and
//! applies review decisions and execution outcomes under the transitions
//! enforced by [`Lifecycle`].

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod lifecycle;
mod locks;
mod manager;
mod priority;

pub use error::{ManagerError, ManagerResult};
pub use lifecycle::{DecisionState, Lifecycle, LifecycleError, LifecycleEvent, LifecycleResult};
pub use locks::RecordLocks;
pub use manager::{DecisionManager, ProcessedDecision, ReviewSubmission};
pub use priority::compute_priority;
