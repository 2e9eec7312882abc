//! Executor errors
//!
//! `Cancelled` is deliberately not surfaced to the operator: a cancelled
//! action was superseded on purpose, so it resolves silently. Everything
//! else translates into a single user notice and a cleared loading flag
//! so the operator can retry immediately.

use crate::api::ApprovalAction;
use approval_types::Permission;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Another action has already dispatched its network call
    #[error("another action is already submitting, please wait")]
    Busy,

    /// This action was superseded before it dispatched. Silent.
    #[error("action was cancelled")]
    Cancelled,

    /// Reject and return-back require a non-empty comment
    #[error("a comment is required and must not be empty")]
    EmptyComment,

    #[error("{0} requires a comment")]
    CommentRequired(ApprovalAction),

    #[error("{0} does not take a comment")]
    CommentNotRequired(ApprovalAction),

    /// The current step does not grant the permission this action needs
    #[error("permission {0} is not granted at the current step")]
    NotPermitted(Permission),

    /// The transition endpoint answered with an error envelope
    #[error("transition rejected: {message}")]
    Remote { message: String },

    #[error("transition call failed: {0}")]
    Transport(#[from] TransitionError),
}

impl ExecutorError {
    /// Whether this failure should be swallowed rather than shown
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failures below the response envelope: the call itself did not complete
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("transition endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("invalid transition response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}
