//! Transition wire contract
//!
//! Four actions share one transition endpoint; the action name selects
//! the route, the request body carries the step id, the acting approver
//! and an optional comment. The response envelope is `error` /
//! `data.message`: a present `error` means the transition was refused
//! server-side even though the call itself succeeded.

use crate::error::{ExecutorError, TransitionError};
use approval_types::Permission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Actions ──────────────────────────────────────────────────────────

/// The four runtime transitions an eligible approver can take
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalAction {
    Approve,
    Reject,
    ReturnBack,
    EditBeforeApproval,
}

impl ApprovalAction {
    /// Reject and return-back must carry a reason; the others must not
    pub fn requires_comment(&self) -> bool {
        matches!(self, Self::Reject | Self::ReturnBack)
    }

    /// The step permission that gates this action
    pub fn required_permission(&self) -> Permission {
        match self {
            Self::Approve => Permission::Approve,
            Self::Reject => Permission::Reject,
            Self::ReturnBack => Permission::ReturnBack,
            Self::EditBeforeApproval => Permission::Update,
        }
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ReturnBack => "return-back",
            Self::EditBeforeApproval => "edit-before-approval",
        };
        write!(f, "{name}")
    }
}

// ── Request / response envelope ──────────────────────────────────────

/// Body sent to the transition endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// Id of the document's current step record
    pub request_step_id: String,
    /// The acting approver
    pub approver_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Response envelope from the transition endpoint
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<TransitionData>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionData {
    #[serde(default)]
    pub message: Option<String>,
}

impl TransitionResponse {
    /// A successful envelope
    pub fn ok() -> Self {
        Self::default()
    }

    /// A refused envelope carrying a server-side message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(serde_json::Value::Bool(true)),
            data: Some(TransitionData {
                message: Some(message.into()),
            }),
        }
    }

    /// Fold the envelope into an outcome for the given action
    pub fn into_outcome(self, action: ApprovalAction) -> Result<ActionOutcome, ExecutorError> {
        if self.error.is_some() {
            let message = self
                .data
                .and_then(|d| d.message)
                .unwrap_or_else(|| format!("{action} was refused"));
            return Err(ExecutorError::Remote { message });
        }
        Ok(match action {
            ApprovalAction::EditBeforeApproval => ActionOutcome::EditingUnlocked,
            transitioned => ActionOutcome::Transitioned(transitioned),
        })
    }
}

/// What a completed action did to the document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The document moved: approved a step, was rejected, or rewound
    Transitioned(ApprovalAction),
    /// The document stayed put; its fields are now editable
    EditingUnlocked,
}

// ── Transport boundary ───────────────────────────────────────────────

/// Transport boundary for the transition endpoint
#[async_trait]
pub trait TransitionApi: Send + Sync {
    async fn submit(
        &self,
        action: ApprovalAction,
        request: TransitionRequest,
    ) -> Result<TransitionResponse, TransitionError>;
}
