//! Approval Workflow Engine
//!
//! Configuration-time and server-side runtime components for approval
//! workflows:
//!
//! - [`ResolvedApprovers`] — splits a step's approvers into role and user
//!   targets
//! - [`StepSequence`] — keeps step order contiguous across add / reorder /
//!   edit operations, addressing steps by stable id
//! - [`StepDraft`] / [`StepEditor`] — validates a candidate step before it
//!   joins the sequence
//! - [`to_editable`] / [`to_persisted`] — the bidirectional mapping between
//!   the persisted (normalized) and editable (denormalized) shapes
//! - [`DefinitionService`] — create / update / fetch of named, versioned
//!   definitions over a [`DefinitionStore`]
//! - [`DocumentProgress`] — the consensus core: counts approvals per step
//!   under ALL/ANY rules and advances, rejects or rewinds the document
//!
//! # Example
//!
//! ```rust
//! use approval_engine::DocumentProgress;
//! use approval_types::*;
//!
//! let def = WorkflowDefinition::new("Order Approval").with_step(
//!     Step::new("Step 1", Consensus::Any)
//!         .with_approver(Approver::role("5"))
//!         .with_approver(Approver::role("7"))
//!         .with_permissions([Permission::Approve, Permission::Reject]),
//! );
//! def.validate().unwrap();
//!
//! let mut progress = DocumentProgress::enter(DocumentId::new("doc-1"), &def).unwrap();
//! progress.approve(&def, &Approver::role("7")).unwrap();
//! assert_eq!(progress.status(), DocumentStatus::Approved);
//! ```

#![deny(unsafe_code)]

pub mod editor;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod sequencer;
pub mod service;
pub mod transform;

pub use editor::{OptionSource, SelectOption, StepDraft, StepEditor};
pub use progress::{ApprovalEvent, DocumentProgress, StepOutcome};
pub use registry::DefinitionRegistry;
pub use resolver::{ApproverTarget, ResolvedApprovers};
pub use sequencer::StepSequence;
pub use service::{DefinitionService, DefinitionStore, InMemoryDefinitionStore};
pub use transform::{to_editable, to_persisted, EditableFlow, EditableStep};
