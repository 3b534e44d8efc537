//! Error types for pipeline domain validation and parsing.

use super::{PipelineState, RunKey};
use thiserror::Error;

/// Errors returned while constructing or mutating domain pipeline values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// The task identifier is empty after trimming.
    #[error("task identifier must not be empty")]
    EmptyTaskId,

    /// The task identifier exceeds the accepted length.
    #[error("task identifier exceeds {limit} characters")]
    TaskIdTooLong {
        /// Maximum accepted length in characters.
        limit: usize,
    },

    /// The task identifier contains interior whitespace.
    #[error("task identifier '{0}' must not contain whitespace")]
    TaskIdWhitespace(String),

    /// The round number is not a positive integer.
    #[error("invalid round number {0}, expected a positive integer")]
    InvalidRound(u32),

    /// The brief is empty after trimming.
    #[error("brief must not be empty")]
    EmptyBrief,

    /// The callback URL is not an absolute http or https URL.
    #[error("invalid callback URL '{0}', expected an absolute http(s) URL")]
    InvalidCallbackUrl(String),

    /// An attachment body could not be decoded.
    #[error("attachment '{name}' is not valid base64: {reason}")]
    InvalidAttachment {
        /// Name of the offending attachment.
        name: String,
        /// Decoder failure description.
        reason: String,
    },

    /// The requested state transition is not permitted by the pipeline
    /// state machine.
    #[error("invalid state transition for run {key}: {from} -> {to}")]
    InvalidStateTransition {
        /// Key of the run whose transition was refused.
        key: RunKey,
        /// State the record was in.
        from: PipelineState,
        /// State the transition targeted.
        to: PipelineState,
    },

    /// Publication details were required but have not been recorded.
    #[error("run {0} has no publication recorded")]
    MissingPublication(RunKey),
}

/// Error returned while parsing pipeline states from their canonical
/// string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pipeline state: {0}")]
pub struct ParsePipelineStateError(pub String);
