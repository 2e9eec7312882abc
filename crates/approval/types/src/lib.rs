//! Approval workflow domain types
//!
//! A [`WorkflowDefinition`] is an ordered sequence of approval steps that a
//! business document must pass through. Each [`Step`] carries its own set of
//! eligible approvers, a consensus rule (ALL vs ANY), and the actions it
//! permits. Definitions are validated before they are stored: step order is
//! a contiguous 1..N sequence, every step has at least one approver, and a
//! step's approvers are homogeneous in kind.

#![deny(unsafe_code)]

pub mod definition;
pub mod document;
pub mod error;
pub mod step;

pub use definition::{WorkflowDefinition, WorkflowDefinitionId};
pub use document::{DocumentId, DocumentStatus};
pub use error::{WorkflowError, WorkflowResult};
pub use step::{Approver, ApproverKind, Consensus, Permission, RoleId, Step, StepId, UserId};
