//! Approver resolver: normalizes a step's approver list
//!
//! The persisted shape carries approvers as a tagged list; the edit shape
//! carries two id lists split by kind. The resolver performs that split
//! and reports the target type the step is aimed at.

use approval_types::{Approver, ApproverKind, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// The target type a step's approver selection is aimed at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverTarget {
    Role,
    User,
}

impl From<ApproverKind> for ApproverTarget {
    fn from(kind: ApproverKind) -> Self {
        match kind {
            ApproverKind::Role => Self::Role,
            ApproverKind::User => Self::User,
        }
    }
}

/// A step's approvers partitioned into disjoint role and user id sets
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedApprovers {
    pub role_ids: Vec<RoleId>,
    pub user_ids: Vec<UserId>,
}

impl ResolvedApprovers {
    /// Partition an approver list by kind, preserving order
    pub fn partition(approvers: &[Approver]) -> Self {
        let mut resolved = Self::default();
        for approver in approvers {
            match approver {
                Approver::Role { role_id } => resolved.role_ids.push(role_id.clone()),
                Approver::User { user_id } => resolved.user_ids.push(user_id.clone()),
            }
        }
        resolved
    }

    /// The target type the step addresses.
    ///
    /// User wins when any user approver exists; for a kind-homogeneous
    /// step (the only shape that validates) this is exact.
    pub fn target(&self) -> Option<ApproverTarget> {
        if !self.user_ids.is_empty() {
            Some(ApproverTarget::User)
        } else if !self.role_ids.is_empty() {
            Some(ApproverTarget::Role)
        } else {
            None
        }
    }

    /// Whether both kinds are present
    pub fn is_mixed(&self) -> bool {
        !self.role_ids.is_empty() && !self.user_ids.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.role_ids.is_empty() && self.user_ids.is_empty()
    }

    /// Reassemble the tagged approver list, roles first
    pub fn into_approvers(self) -> Vec<Approver> {
        let mut approvers = Vec::with_capacity(self.role_ids.len() + self.user_ids.len());
        approvers.extend(
            self.role_ids
                .into_iter()
                .map(|role_id| Approver::Role { role_id }),
        );
        approvers.extend(
            self.user_ids
                .into_iter()
                .map(|user_id| Approver::User { user_id }),
        );
        approvers
    }
}
