//! Shared error type for the approval workflow crates

use crate::document::DocumentStatus;
use crate::step::{Approver, Permission, StepId};
use crate::WorkflowDefinitionId;
use thiserror::Error;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    // ── Definition structure ─────────────────────────────────────────
    #[error("workflow definition not found: {0}")]
    DefinitionNotFound(WorkflowDefinitionId),

    #[error("step not found: {0}")]
    StepNotFound(StepId),

    #[error("workflow must have at least one step")]
    NoSteps,

    #[error("step order must be contiguous from 1 (position {position} has order {found})")]
    NonContiguousOrder { position: usize, found: u32 },

    #[error("step '{0}' has no approvers")]
    EmptyApprovers(StepId),

    #[error("step '{0}' mixes role and user approvers")]
    MixedApproverKinds(StepId),

    // ── Editor validation ────────────────────────────────────────────
    #[error("an approval target type must be selected")]
    MissingTarget,

    #[error("select a target type before choosing a consensus rule")]
    TargetRequiredForConsensus,

    #[error("a consensus rule must be selected")]
    MissingConsensus,

    #[error("approval message is required")]
    MissingApprovalMessage,

    #[error("at least one approver must be selected")]
    NoApproversSelected,

    #[error("selected approvers do not match the chosen target type")]
    TargetMismatch,

    // ── Runtime transitions ──────────────────────────────────────────
    #[error("permission {0} is not granted at step {1}")]
    NotPermitted(Permission, u32),

    #[error("approver {approver} is not eligible at step {step_order}")]
    NotEligible { approver: Approver, step_order: u32 },

    #[error("approver {approver} has already approved step {step_order}")]
    DuplicateApproval { approver: Approver, step_order: u32 },

    #[error("document is already {0:?}")]
    AlreadyTerminal(DocumentStatus),

    #[error("cannot return back from the first step")]
    NoPreviousStep,
}
