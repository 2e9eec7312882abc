//! Runtime action executor for approval workflows
//!
//! Given a document's current step pointer and the permission set the
//! document driver granted the viewer there, the [`ActionExecutor`]
//! dispatches one of four transitions — approve, reject, return-back,
//! edit-before-approval — while enforcing:
//!
//! - comment requirements (reject and return-back refuse empty comments
//!   locally, before any network call)
//! - single-flight concurrency (at most one action `Submitting` per
//!   document; a second invocation during submission gets a "please
//!   wait" error with no extra network call)
//! - cancellation of a superseded action (a new action pre-empts one
//!   still waiting on its comment prompt; the superseded action resolves
//!   silently, since pre-emption is intentional, not a fault)
//!
//! The executor is a per-document session object; sessions for different
//! documents share nothing.

#![deny(unsafe_code)]

pub mod api;
pub mod error;
pub mod executor;
pub mod prompt;

pub use api::{
    ActionOutcome, ApprovalAction, TransitionApi, TransitionData, TransitionRequest,
    TransitionResponse,
};
pub use error::{ExecutorError, TransitionError};
pub use executor::{ActionExecutor, ActionTicket};
pub use prompt::{CommentPrompt, PromptedAction};
