//! Document progress: the server-side consensus core
//!
//! Tracks a document's position in its workflow and is the only mutator
//! of its approval state. A step with `Consensus::All` resolves only
//! when every listed approver has approved; `Consensus::Any` resolves on
//! the first approval. Rejection is terminal at any step. Return-back
//! rewinds to the immediately preceding step and clears the approvals
//! recorded for the departed and destination steps.

use approval_types::{
    Approver, Consensus, DocumentId, DocumentStatus, Permission, Step, WorkflowDefinition,
    WorkflowError, WorkflowResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outcome of one approval at the current step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Consensus not yet satisfied; more approvals needed
    Pending,
    /// Step resolved; document advanced to this order
    Advanced(u32),
    /// Step resolved and it was the last one; document approved
    Approved,
}

/// One recorded transition in a document's approval history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub step_order: u32,
    pub actor: Approver,
    pub action: Permission,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub at: DateTime<Utc>,
}

/// A document's runtime position in a workflow
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentProgress {
    document_id: DocumentId,
    current_step_order: u32,
    status: DocumentStatus,
    /// Approvals recorded per step order
    approvals: HashMap<u32, HashSet<Approver>>,
    /// Whether edit-before-approval has been granted at the current step
    editing_unlocked: bool,
    history: Vec<ApprovalEvent>,
}

impl DocumentProgress {
    /// Enter a document into a workflow at step 1.
    ///
    /// The definition must validate; documents never enter a malformed
    /// workflow.
    pub fn enter(document_id: DocumentId, definition: &WorkflowDefinition) -> WorkflowResult<Self> {
        definition.validate()?;
        tracing::info!(
            document_id = %document_id,
            definition_id = %definition.id,
            "document entered workflow"
        );
        Ok(Self {
            document_id,
            current_step_order: 1,
            status: DocumentStatus::Pending,
            approvals: HashMap::new(),
            editing_unlocked: false,
            history: Vec::new(),
        })
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Record one approval by `actor` at the current step.
    ///
    /// Advances the document when the step's consensus is satisfied;
    /// approving the last step approves the document.
    pub fn approve(
        &mut self,
        definition: &WorkflowDefinition,
        actor: &Approver,
    ) -> WorkflowResult<StepOutcome> {
        let step = self.guard(definition, actor, Permission::Approve)?;
        let consensus = step.consensus;
        let approver_count = step.approvers.len();

        let recorded = self.approvals.entry(self.current_step_order).or_default();
        if !recorded.insert(actor.clone()) {
            return Err(WorkflowError::DuplicateApproval {
                approver: actor.clone(),
                step_order: self.current_step_order,
            });
        }
        let recorded_count = recorded.len();

        self.record(actor.clone(), Permission::Approve, None);

        let resolved = match consensus {
            Consensus::Any => true,
            Consensus::All => recorded_count == approver_count,
        };
        if !resolved {
            return Ok(StepOutcome::Pending);
        }

        if self.current_step_order == definition.last_order() {
            self.status = DocumentStatus::Approved;
            tracing::info!(document_id = %self.document_id, "document approved");
            Ok(StepOutcome::Approved)
        } else {
            self.current_step_order += 1;
            self.editing_unlocked = false;
            tracing::info!(
                document_id = %self.document_id,
                step = self.current_step_order,
                "document advanced"
            );
            Ok(StepOutcome::Advanced(self.current_step_order))
        }
    }

    /// Reject the document. Terminal regardless of remaining approvers.
    pub fn reject(
        &mut self,
        definition: &WorkflowDefinition,
        actor: &Approver,
        comment: impl Into<String>,
    ) -> WorkflowResult<()> {
        self.guard(definition, actor, Permission::Reject)?;
        self.record(actor.clone(), Permission::Reject, Some(comment.into()));
        self.status = DocumentStatus::Rejected;
        tracing::info!(
            document_id = %self.document_id,
            step = self.current_step_order,
            "document rejected"
        );
        Ok(())
    }

    /// Rewind the document to the immediately preceding step.
    ///
    /// Approvals recorded for the departed and destination steps are
    /// cleared so the rewound step is re-approved from scratch.
    pub fn return_back(
        &mut self,
        definition: &WorkflowDefinition,
        actor: &Approver,
        comment: impl Into<String>,
    ) -> WorkflowResult<u32> {
        self.guard(definition, actor, Permission::ReturnBack)?;
        if self.current_step_order <= 1 {
            return Err(WorkflowError::NoPreviousStep);
        }

        self.record(actor.clone(), Permission::ReturnBack, Some(comment.into()));

        let departed = self.current_step_order;
        self.current_step_order -= 1;
        self.approvals.remove(&departed);
        self.approvals.remove(&self.current_step_order);
        self.editing_unlocked = false;

        tracing::info!(
            document_id = %self.document_id,
            from = departed,
            to = self.current_step_order,
            "document returned back"
        );
        Ok(self.current_step_order)
    }

    /// Unlock editing without changing the step pointer
    pub fn unlock_editing(
        &mut self,
        definition: &WorkflowDefinition,
        actor: &Approver,
    ) -> WorkflowResult<()> {
        self.guard(definition, actor, Permission::Update)?;
        self.record(actor.clone(), Permission::Update, None);
        self.editing_unlocked = true;
        tracing::info!(
            document_id = %self.document_id,
            step = self.current_step_order,
            "editing unlocked"
        );
        Ok(())
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn current_step_order(&self) -> u32 {
        self.current_step_order
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn editing_unlocked(&self) -> bool {
        self.editing_unlocked
    }

    /// The permission set the current step grants a viewer.
    ///
    /// Empty when the viewer is not an eligible approver or the document
    /// is terminal. This is what the document driver surfaces to the
    /// action executor.
    pub fn granted_permissions(
        &self,
        definition: &WorkflowDefinition,
        viewer: &Approver,
    ) -> Vec<Permission> {
        if self.is_terminal() {
            return Vec::new();
        }
        match definition.step_at(self.current_step_order) {
            Some(step) if step.has_approver(viewer) => {
                step.permissions.iter().copied().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Approvals recorded so far at the current step
    pub fn approvals_at_current_step(&self) -> usize {
        self.approvals
            .get(&self.current_step_order)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    pub fn history(&self) -> &[ApprovalEvent] {
        &self.history
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Common transition preconditions: not terminal, actor eligible at
    /// the current step, permission granted by the current step.
    fn guard<'d>(
        &self,
        definition: &'d WorkflowDefinition,
        actor: &Approver,
        permission: Permission,
    ) -> WorkflowResult<&'d Step> {
        if self.is_terminal() {
            return Err(WorkflowError::AlreadyTerminal(self.status));
        }
        let step = definition
            .step_at(self.current_step_order)
            .ok_or(WorkflowError::NoSteps)?;
        if !step.has_approver(actor) {
            return Err(WorkflowError::NotEligible {
                approver: actor.clone(),
                step_order: self.current_step_order,
            });
        }
        if !step.allows(permission) {
            return Err(WorkflowError::NotPermitted(
                permission,
                self.current_step_order,
            ));
        }
        Ok(step)
    }

    fn record(&mut self, actor: Approver, action: Permission, comment: Option<String>) {
        self.history.push(ApprovalEvent {
            step_order: self.current_step_order,
            actor,
            action,
            comment,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_types::Step;

    fn make_definition() -> WorkflowDefinition {
        WorkflowDefinition::new("Order Approval")
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
                        Permission::Update,
                    ]),
            )
    }

    fn make_progress(def: &WorkflowDefinition) -> DocumentProgress {
        DocumentProgress::enter(DocumentId::new("doc-1"), def).unwrap()
    }

    #[test]
    fn test_enter_at_step_one() {
        let def = make_definition();
        let progress = make_progress(&def);
        assert_eq!(progress.current_step_order(), 1);
        assert_eq!(progress.status(), DocumentStatus::Pending);
    }

    #[test]
    fn test_enter_rejects_invalid_definition() {
        let def = WorkflowDefinition::new("Empty");
        let result = DocumentProgress::enter(DocumentId::new("doc-1"), &def);
        assert!(matches!(result, Err(WorkflowError::NoSteps)));
    }

    #[test]
    fn test_any_consensus_resolves_on_first_approval() {
        let def = make_definition();
        let mut progress = make_progress(&def);

        let outcome = progress.approve(&def, &Approver::role("7")).unwrap();
        assert_eq!(outcome, StepOutcome::Advanced(2));
        assert_eq!(progress.current_step_order(), 2);
    }

    #[test]
    fn test_all_consensus_needs_every_approver() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        progress.approve(&def, &Approver::role("5")).unwrap();

        let outcome = progress.approve(&def, &Approver::user("101")).unwrap();
        assert_eq!(outcome, StepOutcome::Pending);
        assert_eq!(progress.status(), DocumentStatus::Pending);

        let outcome = progress.approve(&def, &Approver::user("102")).unwrap();
        assert_eq!(outcome, StepOutcome::Approved);
        assert_eq!(progress.status(), DocumentStatus::Approved);
    }

    // The worked scenario: ANY step with Role:5/Role:7, then ALL step
    // with User:101/User:102.
    #[test]
    fn test_example_scenario() {
        let def = make_definition();
        let mut progress = make_progress(&def);

        assert_eq!(
            progress.approve(&def, &Approver::role("7")).unwrap(),
            StepOutcome::Advanced(2)
        );
        assert_eq!(progress.current_step_order(), 2);

        assert_eq!(
            progress.approve(&def, &Approver::user("101")).unwrap(),
            StepOutcome::Pending
        );
        assert_eq!(
            progress.approve(&def, &Approver::user("102")).unwrap(),
            StepOutcome::Approved
        );
        assert_eq!(progress.status(), DocumentStatus::Approved);
    }

    #[test]
    fn test_reject_is_terminal() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        progress
            .reject(&def, &Approver::role("5"), "missing invoice")
            .unwrap();

        assert_eq!(progress.status(), DocumentStatus::Rejected);
        assert!(matches!(
            progress.approve(&def, &Approver::role("7")),
            Err(WorkflowError::AlreadyTerminal(DocumentStatus::Rejected))
        ));
        assert!(matches!(
            progress.reject(&def, &Approver::role("7"), "again"),
            Err(WorkflowError::AlreadyTerminal(_))
        ));
    }

    #[test]
    fn test_duplicate_approval_rejected() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        progress.approve(&def, &Approver::role("5")).unwrap();

        // Step advanced, so approving step 2 twice is the real check
        progress.approve(&def, &Approver::user("101")).unwrap();
        assert!(matches!(
            progress.approve(&def, &Approver::user("101")),
            Err(WorkflowError::DuplicateApproval { .. })
        ));
    }

    #[test]
    fn test_ineligible_actor() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        assert!(matches!(
            progress.approve(&def, &Approver::user("999")),
            Err(WorkflowError::NotEligible { .. })
        ));
    }

    #[test]
    fn test_permission_not_granted() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        // Step 1 does not grant RETURN_BACK
        assert!(matches!(
            progress.return_back(&def, &Approver::role("5"), "go back"),
            Err(WorkflowError::NotPermitted(Permission::ReturnBack, 1))
        ));
    }

    #[test]
    fn test_return_back_rewinds_and_clears() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        progress.approve(&def, &Approver::role("5")).unwrap();
        progress.approve(&def, &Approver::user("101")).unwrap();
        assert_eq!(progress.approvals_at_current_step(), 1);

        let order = progress
            .return_back(&def, &Approver::user("102"), "needs rework")
            .unwrap();
        assert_eq!(order, 1);
        assert_eq!(progress.current_step_order(), 1);
        assert_eq!(progress.approvals_at_current_step(), 0);

        // The rewound step is re-approved from scratch
        assert_eq!(
            progress.approve(&def, &Approver::role("5")).unwrap(),
            StepOutcome::Advanced(2)
        );
        assert_eq!(progress.approvals_at_current_step(), 0);
    }

    #[test]
    fn test_return_back_from_first_step() {
        let mut def = make_definition();
        def.steps[0].permissions.insert(Permission::ReturnBack);
        let mut progress = make_progress(&def);
        assert!(matches!(
            progress.return_back(&def, &Approver::role("5"), "back"),
            Err(WorkflowError::NoPreviousStep)
        ));
    }

    #[test]
    fn test_unlock_editing() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        progress.approve(&def, &Approver::role("5")).unwrap();

        progress
            .unlock_editing(&def, &Approver::user("101"))
            .unwrap();
        assert!(progress.editing_unlocked());
        assert_eq!(progress.current_step_order(), 2);

        // Advancing re-locks
        progress.approve(&def, &Approver::user("101")).unwrap();
        progress.approve(&def, &Approver::user("102")).unwrap();
        assert_eq!(progress.status(), DocumentStatus::Approved);
    }

    #[test]
    fn test_granted_permissions() {
        let def = make_definition();
        let progress = make_progress(&def);

        let granted = progress.granted_permissions(&def, &Approver::role("5"));
        assert!(granted.contains(&Permission::Approve));
        assert!(granted.contains(&Permission::Reject));
        assert!(!granted.contains(&Permission::ReturnBack));

        // Step 2 approvers see nothing at step 1
        assert!(progress
            .granted_permissions(&def, &Approver::user("101"))
            .is_empty());
    }

    #[test]
    fn test_granted_permissions_empty_when_terminal() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        progress
            .reject(&def, &Approver::role("5"), "no")
            .unwrap();
        assert!(progress
            .granted_permissions(&def, &Approver::role("5"))
            .is_empty());
    }

    #[test]
    fn test_history_records_comments() {
        let def = make_definition();
        let mut progress = make_progress(&def);
        progress.approve(&def, &Approver::role("5")).unwrap();
        progress
            .reject(&def, &Approver::user("101"), "budget exceeded")
            .unwrap();

        let history = progress.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, Permission::Approve);
        assert_eq!(history[0].comment, None);
        assert_eq!(history[1].action, Permission::Reject);
        assert_eq!(history[1].comment.as_deref(), Some("budget exceeded"));
        assert_eq!(history[1].step_order, 2);
    }
}
