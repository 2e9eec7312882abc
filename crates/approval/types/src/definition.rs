//! Workflow definitions: the configured sequence of approval steps
//!
//! A WorkflowDefinition is an ordered list of steps with a contiguous
//! 1..N order. Definitions are validated before every write: the
//! definition service refuses to persist a shape that violates the
//! invariants here.

use crate::error::{WorkflowError, WorkflowResult};
use crate::step::{ApproverKind, Step, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifier ───────────────────────────────────────────────────────

/// Unique identifier for a workflow definition
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowDefinitionId(pub String);

impl WorkflowDefinitionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// First eight bytes, backed off to a char boundary
    pub fn short(&self) -> &str {
        let mut end = 8.min(self.0.len());
        while !self.0.is_char_boundary(end) {
            end -= 1;
        }
        &self.0[..end]
    }
}

impl std::fmt::Display for WorkflowDefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Workflow Definition ──────────────────────────────────────────────

/// A named, versioned sequence of approval steps
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Unique identifier
    pub id: WorkflowDefinitionId,
    /// Human-readable name
    pub name: String,
    /// Description of what this workflow approves
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether documents may currently enter this workflow
    pub active: bool,
    /// Version, bumped by the definition service on every update
    pub version: u32,
    /// The ordered approval steps
    pub steps: Vec<Step>,
    /// When this definition was created
    pub created_at: DateTime<Utc>,
    /// When this definition was last updated
    pub updated_at: DateTime<Utc>,
}

impl WorkflowDefinition {
    /// Create a new, empty workflow definition
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowDefinitionId::generate(),
            name: name.into(),
            description: String::new(),
            active: true,
            version: 1,
            steps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Append a step, assigning it the next order
    pub fn with_step(mut self, mut step: Step) -> Self {
        step.order = self.steps.len() as u32 + 1;
        self.steps.push(step);
        self
    }

    /// Get a step by its stable id
    pub fn get_step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    /// Get the step at a given 1-based order
    pub fn step_at(&self, order: u32) -> Option<&Step> {
        self.steps.iter().find(|s| s.order == order)
    }

    /// The last step's order, or 0 for an empty definition
    pub fn last_order(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Validate the definition for structural correctness.
    ///
    /// Checks the sequence invariant (contiguous 1..N order) and every
    /// per-step invariant (non-empty, kind-homogeneous approvers).
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.steps.is_empty() {
            return Err(WorkflowError::NoSteps);
        }

        for (position, step) in self.steps.iter().enumerate() {
            let expected = position as u32 + 1;
            if step.order != expected {
                return Err(WorkflowError::NonContiguousOrder {
                    position,
                    found: step.order,
                });
            }

            if step.approvers.is_empty() {
                return Err(WorkflowError::EmptyApprovers(step.id.clone()));
            }

            // A step targets either roles or users, never both
            let first_kind = step.approvers[0].kind();
            if step.approvers.iter().any(|a| a.kind() != first_kind) {
                return Err(WorkflowError::MixedApproverKinds(step.id.clone()));
            }
        }

        Ok(())
    }

    /// The approver kind targeted by a validated step
    pub fn target_kind(&self, order: u32) -> Option<ApproverKind> {
        self.step_at(order)
            .and_then(|s| s.approvers.first())
            .map(|a| a.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Approver, Consensus, Permission};

    fn make_definition() -> WorkflowDefinition {
        WorkflowDefinition::new("Purchase Order Approval")
            .with_description("Two-stage approval for purchase orders")
            .with_step(
                Step::new("Step 1", Consensus::Any)
                    .with_approver(Approver::role("5"))
                    .with_approver(Approver::role("7"))
                    .with_permissions([Permission::Approve, Permission::Reject]),
            )
            .with_step(
                Step::new("Step 2", Consensus::All)
                    .with_approver(Approver::user("101"))
                    .with_approver(Approver::user("102"))
                    .with_permissions([
                        Permission::Approve,
                        Permission::Reject,
                        Permission::ReturnBack,
                    ]),
            )
    }

    #[test]
    fn test_create_and_validate() {
        let def = make_definition();
        assert_eq!(def.step_count(), 2);
        assert_eq!(def.last_order(), 2);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_id_short_backs_off_to_char_boundary() {
        // The arrow spans bytes 6..9, straddling the cut at 8
        let id = WorkflowDefinitionId::new("draft-→12");
        assert_eq!(id.short(), "draft-");
    }

    #[test]
    fn test_with_step_assigns_order() {
        let def = make_definition();
        assert_eq!(def.steps[0].order, 1);
        assert_eq!(def.steps[1].order, 2);
    }

    #[test]
    fn test_validate_empty() {
        let def = WorkflowDefinition::new("Empty");
        assert!(matches!(def.validate(), Err(WorkflowError::NoSteps)));
    }

    #[test]
    fn test_validate_non_contiguous() {
        let mut def = make_definition();
        def.steps[1].order = 3;
        assert!(matches!(
            def.validate(),
            Err(WorkflowError::NonContiguousOrder {
                position: 1,
                found: 3
            })
        ));
    }

    #[test]
    fn test_validate_empty_approvers() {
        let mut def = make_definition();
        def.steps[0].approvers.clear();
        assert!(matches!(
            def.validate(),
            Err(WorkflowError::EmptyApprovers(_))
        ));
    }

    #[test]
    fn test_validate_mixed_kinds() {
        let mut def = make_definition();
        def.steps[0].approvers.push(Approver::user("101"));
        assert!(matches!(
            def.validate(),
            Err(WorkflowError::MixedApproverKinds(_))
        ));
    }

    #[test]
    fn test_lookup() {
        let def = make_definition();
        let id = def.steps[1].id.clone();
        assert_eq!(def.get_step(&id).unwrap().order, 2);
        assert_eq!(def.step_at(1).unwrap().title, "Step 1");
        assert!(def.step_at(3).is_none());
    }

    #[test]
    fn test_target_kind() {
        let def = make_definition();
        assert_eq!(def.target_kind(1), Some(crate::step::ApproverKind::Role));
        assert_eq!(def.target_kind(2), Some(crate::step::ApproverKind::User));
        assert_eq!(def.target_kind(9), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let def = make_definition();
        let json = serde_json::to_string(&def).unwrap();
        let back: WorkflowDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }
}
