//! Comment prompt
//!
//! Reject and return-back need a reason from the operator. Instead of a
//! flag the view polls, the prompt is a pair: the surface that collects
//! the comment holds a [`CommentPrompt`], the caller awaits the
//! [`PromptedAction`]. Submitting resolves the action; dismissing the
//! prompt, or starting another action while it is open, resolves it as
//! a silent cancellation.

use crate::api::{ActionOutcome, TransitionApi};
use crate::error::ExecutorError;
use crate::executor::ActionTicket;
use tokio::sync::oneshot;

impl<T: TransitionApi> ActionTicket<T> {
    /// Split a comment-carrying ticket into its prompt and its outcome
    pub fn into_prompt(self) -> Result<(CommentPrompt, PromptedAction<T>), ExecutorError> {
        if !self.action.requires_comment() {
            return Err(ExecutorError::CommentNotRequired(self.action));
        }
        let (tx, rx) = oneshot::channel();
        Ok((CommentPrompt { tx }, PromptedAction { ticket: self, rx }))
    }
}

/// Handle held by whatever surface collects the comment
#[derive(Debug)]
pub struct CommentPrompt {
    tx: oneshot::Sender<String>,
}

impl CommentPrompt {
    /// Hand the collected comment to the waiting action
    pub fn submit(self, comment: impl Into<String>) {
        let _ = self.tx.send(comment.into());
    }

    /// Close the prompt without a comment, abandoning the action
    pub fn dismiss(self) {}
}

/// An action blocked on its comment prompt
#[derive(Debug)]
pub struct PromptedAction<T: TransitionApi> {
    ticket: ActionTicket<T>,
    rx: oneshot::Receiver<String>,
}

impl<T: TransitionApi> PromptedAction<T> {
    /// Wait for the prompt, then submit
    ///
    /// Resolves [`ExecutorError::Cancelled`] if the prompt is dismissed
    /// or the action is superseded while the prompt is still open.
    pub async fn wait(self) -> Result<ActionOutcome, ExecutorError> {
        let Self { ticket, rx } = self;
        tokio::select! {
            _ = ticket.cancel.cancelled() => Err(ExecutorError::Cancelled),
            comment = rx => match comment {
                Ok(comment) => ticket.submit_comment(&comment).await,
                Err(_) => {
                    ticket.cancel().await;
                    Err(ExecutorError::Cancelled)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApprovalAction, TransitionRequest, TransitionResponse};
    use crate::error::TransitionError;
    use crate::executor::ActionExecutor;
    use approval_types::Permission;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TransitionApi for CountingApi {
        async fn submit(
            &self,
            _action: ApprovalAction,
            _request: TransitionRequest,
        ) -> Result<TransitionResponse, TransitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TransitionResponse::ok())
        }
    }

    fn make_executor(api: Arc<CountingApi>) -> ActionExecutor<CountingApi> {
        ActionExecutor::new(api, "rs-1", "u-9", Permission::ALL.into_iter().collect())
    }

    #[tokio::test]
    async fn test_prompt_submit_resolves_action() {
        let api = Arc::new(CountingApi::default());
        let executor = make_executor(Arc::clone(&api));

        let ticket = executor.reject().await.unwrap();
        let (prompt, action) = ticket.into_prompt().unwrap();

        prompt.submit("duplicate request");
        let outcome = action.wait().await.unwrap();
        assert_eq!(outcome, ActionOutcome::Transitioned(ApprovalAction::Reject));
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dismiss_is_silent() {
        let api = Arc::new(CountingApi::default());
        let executor = make_executor(Arc::clone(&api));

        let ticket = executor.return_back().await.unwrap();
        let (prompt, action) = ticket.into_prompt().unwrap();

        prompt.dismiss();
        let result = action.wait().await;
        match result {
            Err(err) => assert!(err.is_silent()),
            Ok(outcome) => panic!("dismissed action completed: {outcome:?}"),
        }
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);

        // The session is free again
        executor.approve().await.unwrap();
    }

    #[tokio::test]
    async fn test_supersede_while_prompt_open() {
        let api = Arc::new(CountingApi::default());
        let executor = make_executor(Arc::clone(&api));

        let ticket = executor.reject().await.unwrap();
        let (_prompt, action) = ticket.into_prompt().unwrap();

        // A new action pre-empts the one still waiting on its comment
        let outcome = executor.approve().await.unwrap();
        assert_eq!(outcome, ActionOutcome::Transitioned(ApprovalAction::Approve));

        let result = action.wait().await;
        assert!(matches!(result, Err(ExecutorError::Cancelled)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prompt_refused_for_comment_free_action() {
        let api = Arc::new(CountingApi::default());
        let executor = make_executor(api);

        let ticket = executor.begin(ApprovalAction::Approve).await.unwrap();
        assert!(matches!(
            ticket.into_prompt(),
            Err(ExecutorError::CommentNotRequired(ApprovalAction::Approve))
        ));
    }
}
