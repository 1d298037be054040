//! Reasoning records, lexical extraction, and completeness validation.
//!
//! [`ReasoningExtractor`] reconstructs an agent's situation, findings,
//! options, selected action, rationale, and risks from a normalised
//! conversation. The resulting [`ReasoningRecord`] carries a completeness
//! score computed by [`validate`] and later accumulates governance, review,
//! and execution state.

#![warn(missing_docs, clippy::pedantic)]

mod action;
mod extractor;
mod governance;
mod patterns;
mod record;
mod validator;

pub use action::{ActionArguments, SelectedAction};
pub use extractor::{ExtractionRequest, ReasoningExtractor};
pub use governance::{
    ExecutionOutcome, ExecutionStatus, GovernanceDecision, GovernanceOutcome, HumanDecision,
    HumanReview, PolicyCheckResult, Severity,
};
pub use patterns::{PatternRule, PatternTable, ReasoningField};
pub use record::{
    ConsideredOption, ExtractedReasoning, Provenance, QuantitativeFindings, ReasoningRecord,
};
pub use validator::{
    Component, REQUIRED_COMPONENTS, VALID_THRESHOLD, ValidationResult, assess, validate,
};
