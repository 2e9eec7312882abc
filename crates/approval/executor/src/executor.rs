//! Single-flight action executor
//!
//! One executor per open document. Starting an action yields an
//! [`ActionTicket`]; only the ticket whose sequence number still matches
//! the session's in-flight slot may submit. Starting a new action while
//! an earlier one is still gathering its comment cancels the earlier
//! one; starting one while a submission is on the wire fails with
//! [`ExecutorError::Busy`] instead, so a slow network can never produce
//! two conflicting transitions for the same document.

use crate::api::{ActionOutcome, ApprovalAction, TransitionApi, TransitionRequest};
use crate::error::ExecutorError;
use approval_types::Permission;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

// ── Session state ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Waiting on the operator's comment; may be superseded
    AwaitingComment,
    /// Ready to dispatch; may be superseded
    Ready,
    /// Network call on the wire; may NOT be superseded
    Submitting,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    action: ApprovalAction,
    phase: Phase,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct SessionState {
    next_seq: u64,
    current: Option<InFlight>,
}

// ── Executor ─────────────────────────────────────────────────────────

/// Per-document action session
#[derive(Debug)]
pub struct ActionExecutor<T: TransitionApi> {
    api: Arc<T>,
    request_step_id: String,
    approver_id: String,
    granted: BTreeSet<Permission>,
    state: Arc<Mutex<SessionState>>,
}

// Manual impl: cloning shares the session, T itself need not be Clone
impl<T: TransitionApi> Clone for ActionExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            request_step_id: self.request_step_id.clone(),
            approver_id: self.approver_id.clone(),
            granted: self.granted.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: TransitionApi> ActionExecutor<T> {
    pub fn new(
        api: Arc<T>,
        request_step_id: impl Into<String>,
        approver_id: impl Into<String>,
        granted: BTreeSet<Permission>,
    ) -> Self {
        Self {
            api,
            request_step_id: request_step_id.into(),
            approver_id: approver_id.into(),
            granted,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Start an action, superseding any action still gathering input
    pub async fn begin(&self, action: ApprovalAction) -> Result<ActionTicket<T>, ExecutorError> {
        let permission = action.required_permission();
        if !self.granted.contains(&permission) {
            return Err(ExecutorError::NotPermitted(permission));
        }

        let mut state = self.state.lock().await;
        if let Some(inflight) = &state.current {
            if inflight.phase == Phase::Submitting {
                return Err(ExecutorError::Busy);
            }
            tracing::debug!(
                superseded = %inflight.action,
                by = %action,
                "pending action superseded"
            );
            inflight.cancel.cancel();
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let cancel = CancellationToken::new();
        let phase = if action.requires_comment() {
            Phase::AwaitingComment
        } else {
            Phase::Ready
        };
        state.current = Some(InFlight {
            seq,
            action,
            phase,
            cancel: cancel.clone(),
        });

        Ok(ActionTicket {
            executor: self.clone(),
            seq,
            action,
            cancel,
        })
    }

    /// Approve in one call; approval takes no comment
    pub async fn approve(&self) -> Result<ActionOutcome, ExecutorError> {
        self.begin(ApprovalAction::Approve).await?.dispatch().await
    }

    /// Unlock editing in one call; takes no comment
    pub async fn edit_before_approval(&self) -> Result<ActionOutcome, ExecutorError> {
        self.begin(ApprovalAction::EditBeforeApproval)
            .await?
            .dispatch()
            .await
    }

    /// Start a rejection; the ticket still needs its comment
    pub async fn reject(&self) -> Result<ActionTicket<T>, ExecutorError> {
        self.begin(ApprovalAction::Reject).await
    }

    /// Start a return-back; the ticket still needs its comment
    pub async fn return_back(&self) -> Result<ActionTicket<T>, ExecutorError> {
        self.begin(ApprovalAction::ReturnBack).await
    }
}

// ── Ticket ───────────────────────────────────────────────────────────

/// A started action, valid until superseded or cancelled
#[derive(Debug)]
pub struct ActionTicket<T: TransitionApi> {
    pub(crate) executor: ActionExecutor<T>,
    pub(crate) seq: u64,
    pub(crate) action: ApprovalAction,
    pub(crate) cancel: CancellationToken,
}

impl<T: TransitionApi> ActionTicket<T> {
    pub fn action(&self) -> ApprovalAction {
        self.action
    }

    /// Submit a comment-free action
    pub async fn dispatch(self) -> Result<ActionOutcome, ExecutorError> {
        if self.action.requires_comment() {
            return Err(ExecutorError::CommentRequired(self.action));
        }
        self.dispatch_inner(None).await
    }

    /// Submit a comment-carrying action; the comment may not be blank
    pub async fn submit_comment(
        self,
        comment: impl AsRef<str>,
    ) -> Result<ActionOutcome, ExecutorError> {
        if !self.action.requires_comment() {
            return Err(ExecutorError::CommentNotRequired(self.action));
        }
        let trimmed = comment.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ExecutorError::EmptyComment);
        }
        self.dispatch_inner(Some(trimmed.to_owned())).await
    }

    /// Abandon this action without submitting
    pub async fn cancel(self) {
        let mut state = self.executor.state.lock().await;
        if let Some(inflight) = &state.current {
            if inflight.seq == self.seq && inflight.phase != Phase::Submitting {
                inflight.cancel.cancel();
                state.current = None;
            }
        }
    }

    pub(crate) async fn dispatch_inner(
        self,
        comment: Option<String>,
    ) -> Result<ActionOutcome, ExecutorError> {
        {
            let mut state = self.executor.state.lock().await;
            let live = matches!(
                &state.current,
                Some(inflight) if inflight.seq == self.seq && !inflight.cancel.is_cancelled()
            );
            if !live {
                return Err(ExecutorError::Cancelled);
            }
            if let Some(inflight) = &mut state.current {
                inflight.phase = Phase::Submitting;
            }
        }

        let request = TransitionRequest {
            request_step_id: self.executor.request_step_id.clone(),
            approver_id: self.executor.approver_id.clone(),
            comment,
        };
        let result = self.executor.api.submit(self.action, request).await;

        {
            let mut state = self.executor.state.lock().await;
            if matches!(&state.current, Some(inflight) if inflight.seq == self.seq) {
                state.current = None;
            }
        }

        let outcome = result?.into_outcome(self.action)?;
        tracing::info!(
            action = %self.action,
            request_step_id = %self.executor.request_step_id,
            "transition completed"
        );
        Ok(outcome)
    }
}
