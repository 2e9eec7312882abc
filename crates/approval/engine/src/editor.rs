//! Step editor: validates a candidate step before it joins the sequence
//!
//! A StepDraft accumulates the operator's selections. The draft is only
//! committable once a target type is chosen, at least one approver of
//! that kind is selected, a consensus rule is picked, and the approval
//! message is present. Committing by index replaces that entry;
//! committing without an index appends.

use crate::resolver::ApproverTarget;
use crate::sequencer::StepSequence;
use approval_types::{
    Approver, Consensus, Permission, RoleId, Step, UserId, WorkflowError, WorkflowResult,
};
use std::collections::BTreeSet;

// ── Collaborator option sources ──────────────────────────────────────

/// One selectable entry from an external list (roles, users, modules)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

/// An opaque source of selectable options.
///
/// The editor only populates dropdowns from these; directory management
/// lives elsewhere.
pub trait OptionSource {
    fn options(&self) -> Vec<SelectOption>;
}

// ── Step draft ───────────────────────────────────────────────────────

/// A candidate step under edit
#[derive(Clone, Debug, Default)]
pub struct StepDraft {
    target: Option<ApproverTarget>,
    selected_roles: Vec<RoleId>,
    selected_users: Vec<UserId>,
    consensus: Option<Consensus>,
    permissions: BTreeSet<Permission>,
    approval_message: String,
    notification_message: String,
}

impl StepDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the target type. Switching targets clears the selection
    /// made for the previous one.
    pub fn set_target(&mut self, target: ApproverTarget) {
        if self.target != Some(target) {
            self.selected_roles.clear();
            self.selected_users.clear();
        }
        self.target = Some(target);
    }

    pub fn target(&self) -> Option<ApproverTarget> {
        self.target
    }

    /// Select a consensus rule; only allowed once a target is chosen
    pub fn set_consensus(&mut self, consensus: Consensus) -> WorkflowResult<()> {
        if self.target.is_none() {
            return Err(WorkflowError::TargetRequiredForConsensus);
        }
        self.consensus = Some(consensus);
        Ok(())
    }

    pub fn select_role(&mut self, role: RoleId) {
        if !self.selected_roles.contains(&role) {
            self.selected_roles.push(role);
        }
    }

    pub fn select_user(&mut self, user: UserId) {
        if !self.selected_users.contains(&user) {
            self.selected_users.push(user);
        }
    }

    /// Toggle a permission in the multi-select
    pub fn toggle_permission(&mut self, permission: Permission) {
        if !self.permissions.remove(&permission) {
            self.permissions.insert(permission);
        }
    }

    pub fn set_approval_message(&mut self, message: impl Into<String>) {
        self.approval_message = message.into();
    }

    pub fn set_notification_message(&mut self, message: impl Into<String>) {
        self.notification_message = message.into();
    }

    /// Validate the draft against the editor rules.
    ///
    /// These are client-local configuration errors; nothing invalid is
    /// ever sent to the store.
    pub fn validate(&self) -> WorkflowResult<()> {
        let target = self.target.ok_or(WorkflowError::MissingTarget)?;

        match target {
            ApproverTarget::Role => {
                if self.selected_roles.is_empty() {
                    return Err(WorkflowError::NoApproversSelected);
                }
                if !self.selected_users.is_empty() {
                    return Err(WorkflowError::TargetMismatch);
                }
            }
            ApproverTarget::User => {
                if self.selected_users.is_empty() {
                    return Err(WorkflowError::NoApproversSelected);
                }
                if !self.selected_roles.is_empty() {
                    return Err(WorkflowError::TargetMismatch);
                }
            }
        }

        if self.consensus.is_none() {
            return Err(WorkflowError::MissingConsensus);
        }

        if self.approval_message.trim().is_empty() {
            return Err(WorkflowError::MissingApprovalMessage);
        }

        Ok(())
    }

    /// Build the step this draft describes. Title is positional and is
    /// assigned by the transform on persistence; a placeholder is fine.
    fn build(&self) -> WorkflowResult<Step> {
        self.validate()?;
        let consensus = self.consensus.ok_or(WorkflowError::MissingConsensus)?;

        let approvers: Vec<Approver> = match self.target {
            Some(ApproverTarget::Role) => self
                .selected_roles
                .iter()
                .cloned()
                .map(|role_id| Approver::Role { role_id })
                .collect(),
            Some(ApproverTarget::User) => self
                .selected_users
                .iter()
                .cloned()
                .map(|user_id| Approver::User { user_id })
                .collect(),
            None => return Err(WorkflowError::MissingTarget),
        };

        let mut step = Step::new("Step", consensus)
            .with_approval_message(self.approval_message.clone())
            .with_notification_message(self.notification_message.clone());
        step.permissions = self.permissions.clone();
        step.approvers = approvers;
        Ok(step)
    }
}

// ── Step editor ──────────────────────────────────────────────────────

/// Commits validated drafts into a step sequence
#[derive(Clone, Debug, Default)]
pub struct StepEditor;

impl StepEditor {
    pub fn new() -> Self {
        Self
    }

    /// Commit a draft: `Some(index)` replaces the entry being edited
    /// (the slot keeps its stable id), `None` appends a new step.
    pub fn commit(
        &self,
        draft: &StepDraft,
        sequence: &mut StepSequence,
        index: Option<usize>,
    ) -> WorkflowResult<()> {
        let step = draft.build()?;
        match index {
            Some(index) => sequence.replace(index, step),
            None => sequence.push(step),
        }
        Ok(())
    }
}
