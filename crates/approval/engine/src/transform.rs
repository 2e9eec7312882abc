//! Workflow definition transform: persisted shape ↔ editable shape
//!
//! The server-normalized shape carries tagged approver records per step;
//! the edit surface works with two id lists split by kind plus a single
//! target selection. The two mappings here are mutual inverses on the
//! semantically meaningful fields (consensus, permissions, approver id
//! sets); step titles are positional and always regenerated on the way
//! back, never compared.

use crate::resolver::{ApproverTarget, ResolvedApprovers};
use approval_types::{
    Consensus, Permission, RoleId, Step, StepId, UserId, WorkflowDefinition, WorkflowError,
    WorkflowResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Editable shapes ──────────────────────────────────────────────────

/// The denormalized, UI-editable form of one step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditableStep {
    /// Stable identity carried through the edit session
    pub step_id: StepId,
    /// The single target selection governing the whole step
    pub target: ApproverTarget,
    pub selected_roles: Vec<RoleId>,
    pub selected_users: Vec<UserId>,
    pub consensus: Consensus,
    pub permissions: BTreeSet<Permission>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub approval_message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notification_message: String,
}

/// The denormalized, UI-editable form of a whole definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditableFlow {
    pub id: approval_types::WorkflowDefinitionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub active: bool,
    pub version: u32,
    pub steps: Vec<EditableStep>,
}

// ── Mappings ─────────────────────────────────────────────────────────

/// Map a persisted definition into its editable form.
///
/// Each step's approvers are partitioned by kind; the target is USER if
/// any user approver exists, else ROLE. Mixed-kind steps cannot be
/// represented on the edit surface and are rejected.
pub fn to_editable(definition: &WorkflowDefinition) -> WorkflowResult<EditableFlow> {
    let mut steps = Vec::with_capacity(definition.steps.len());

    for step in &definition.steps {
        let resolved = ResolvedApprovers::partition(&step.approvers);
        if resolved.is_mixed() {
            return Err(WorkflowError::MixedApproverKinds(step.id.clone()));
        }
        let target = resolved
            .target()
            .ok_or_else(|| WorkflowError::EmptyApprovers(step.id.clone()))?;

        steps.push(EditableStep {
            step_id: step.id.clone(),
            target,
            selected_roles: resolved.role_ids,
            selected_users: resolved.user_ids,
            consensus: step.consensus,
            permissions: step.permissions.clone(),
            approval_message: step.approval_message.clone(),
            notification_message: step.notification_message.clone(),
        });
    }

    Ok(EditableFlow {
        id: definition.id.clone(),
        name: definition.name.clone(),
        description: definition.description.clone(),
        active: definition.active,
        version: definition.version,
        steps,
    })
}

/// Map an editable flow back into the persisted shape.
///
/// Step `i` (0-based) gets `order = i + 1` and `title = "Step {i+1}"`;
/// the split id lists convert back to tagged approver records; consensus
/// and permissions copy through unchanged.
pub fn to_persisted(flow: &EditableFlow) -> WorkflowDefinition {
    let now = chrono::Utc::now();
    let steps = flow
        .steps
        .iter()
        .enumerate()
        .map(|(i, editable)| {
            let resolved = ResolvedApprovers {
                role_ids: editable.selected_roles.clone(),
                user_ids: editable.selected_users.clone(),
            };
            Step {
                id: editable.step_id.clone(),
                order: i as u32 + 1,
                title: format!("Step {}", i + 1),
                consensus: editable.consensus,
                permissions: editable.permissions.clone(),
                approvers: resolved.into_approvers(),
                approval_message: editable.approval_message.clone(),
                notification_message: editable.notification_message.clone(),
            }
        })
        .collect();

    WorkflowDefinition {
        id: flow.id.clone(),
        name: flow.name.clone(),
        description: flow.description.clone(),
        active: flow.active,
        version: flow.version,
        steps,
        created_at: now,
        updated_at: now,
    }
}
