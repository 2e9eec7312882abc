//! Approval steps: one stage in a workflow
//!
//! A Step names who may act (its approvers), how agreement is reached
//! (its consensus rule), and which actions it exposes (its permission
//! set). Permission-derived flags are computed on read — the permission
//! set is the single source of truth.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Identifiers ──────────────────────────────────────────────────────

/// Stable identity of a step, assigned at creation time.
///
/// Reordering and editing resolve steps by this id, never by array
/// position, so edits made mid-reorder land on the right step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub String);

impl StepId {
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

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a role in the external role directory
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user in the external user directory
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Permissions ──────────────────────────────────────────────────────

/// An action a step may expose to its approvers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Add,
    Approve,
    Reject,
    Update,
    ReturnBack,
}

impl Permission {
    /// Every permission, in canonical order
    pub const ALL: [Permission; 5] = [
        Permission::Add,
        Permission::Approve,
        Permission::Reject,
        Permission::Update,
        Permission::ReturnBack,
    ];
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Permission::Add => "ADD",
            Permission::Approve => "APPROVE",
            Permission::Reject => "REJECT",
            Permission::Update => "UPDATE",
            Permission::ReturnBack => "RETURN_BACK",
        };
        write!(f, "{}", s)
    }
}

// ── Consensus ────────────────────────────────────────────────────────

/// How a step's approvals are counted before it resolves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consensus {
    /// Every approver must individually approve
    All,
    /// The first approval resolves the step
    #[default]
    Any,
}

// ── Approvers ────────────────────────────────────────────────────────

/// A role or a specific user eligible to act at a step
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Approver {
    Role { role_id: RoleId },
    User { user_id: UserId },
}

impl Approver {
    pub fn role(id: impl Into<String>) -> Self {
        Self::Role {
            role_id: RoleId::new(id),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::User {
            user_id: UserId::new(id),
        }
    }

    pub fn kind(&self) -> ApproverKind {
        match self {
            Self::Role { .. } => ApproverKind::Role,
            Self::User { .. } => ApproverKind::User,
        }
    }
}

impl std::fmt::Display for Approver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Approver::Role { role_id } => write!(f, "role:{}", role_id),
            Approver::User { user_id } => write!(f, "user:{}", user_id),
        }
    }
}

/// The kind of an approver target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverKind {
    Role,
    User,
}

// ── Step ─────────────────────────────────────────────────────────────

/// One stage in an approval workflow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identity, independent of position
    pub id: StepId,
    /// 1-based position in the sequence; contiguous across the definition
    pub order: u32,
    /// Display title, regenerated from position on persistence
    pub title: String,
    /// ALL or ANY
    pub consensus: Consensus,
    /// Actions this step exposes
    pub permissions: BTreeSet<Permission>,
    /// Who may act at this step; non-empty, homogeneous in kind
    pub approvers: Vec<Approver>,
    /// Message shown when the step resolves
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub approval_message: String,
    /// Message sent to the next step's approvers
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notification_message: String,
}

impl Step {
    /// Create a new step with a generated id and a placeholder order.
    ///
    /// The sequencer assigns the real order when the step joins a
    /// sequence.
    pub fn new(title: impl Into<String>, consensus: Consensus) -> Self {
        Self {
            id: StepId::generate(),
            order: 0,
            title: title.into(),
            consensus,
            permissions: BTreeSet::new(),
            approvers: Vec::new(),
            approval_message: String::new(),
            notification_message: String::new(),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    pub fn with_approver(mut self, approver: Approver) -> Self {
        self.approvers.push(approver);
        self
    }

    pub fn with_approval_message(mut self, message: impl Into<String>) -> Self {
        self.approval_message = message.into();
        self
    }

    pub fn with_notification_message(mut self, message: impl Into<String>) -> Self {
        self.notification_message = message.into();
        self
    }

    // ── Permission projections ───────────────────────────────────────
    //
    // Computed on read; there is no stored boolean alongside the set.

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn allows_approval(&self) -> bool {
        self.allows(Permission::Approve)
    }

    pub fn allows_reject(&self) -> bool {
        self.allows(Permission::Reject)
    }

    pub fn allows_return_back(&self) -> bool {
        self.allows(Permission::ReturnBack)
    }

    pub fn allows_edit_before_approval(&self) -> bool {
        self.allows(Permission::Update)
    }

    /// Check whether a specific approver is eligible at this step
    pub fn has_approver(&self, approver: &Approver) -> bool {
        self.approvers.contains(approver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_permission_projections() {
        let step = Step::new("Review", Consensus::Any)
            .with_permission(Permission::Approve)
            .with_permission(Permission::Reject);

        assert!(step.allows_approval());
        assert!(step.allows_reject());
        assert!(!step.allows_return_back());
        assert!(!step.allows_edit_before_approval());
    }

    #[test]
    fn test_approver_kinds() {
        let role = Approver::role("5");
        let user = Approver::user("101");
        assert_eq!(role.kind(), ApproverKind::Role);
        assert_eq!(user.kind(), ApproverKind::User);
        assert_eq!(format!("{}", role), "role:5");
        assert_eq!(format!("{}", user), "user:101");
    }

    #[test]
    fn test_approver_tagged_serialization() {
        let role = Approver::role("5");
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["type"], "ROLE");
        assert_eq!(json["role_id"], "5");

        let back: Approver = serde_json::from_value(json).unwrap();
        assert_eq!(back, role);
    }

    #[test]
    fn test_permission_wire_names() {
        let json = serde_json::to_value(Permission::ReturnBack).unwrap();
        assert_eq!(json, "RETURN_BACK");
        let back: Permission = serde_json::from_value(json).unwrap();
        assert_eq!(back, Permission::ReturnBack);
    }

    #[test]
    fn test_step_has_approver() {
        let step = Step::new("Review", Consensus::All)
            .with_approver(Approver::user("101"))
            .with_approver(Approver::user("102"));

        assert!(step.has_approver(&Approver::user("101")));
        assert!(!step.has_approver(&Approver::user("103")));
        assert!(!step.has_approver(&Approver::role("101")));
    }

    #[test]
    fn test_step_id() {
        let id = StepId::generate();
        assert!(!id.0.is_empty());
        assert!(id.short().len() <= 8);

        let named = StepId::new("step-1");
        assert_eq!(format!("{}", named), "step-1");
    }

    #[test]
    fn test_step_id_short_backs_off_to_char_boundary() {
        // The arrow spans bytes 6..9, straddling the cut at 8
        let id = StepId::new("draft-→12");
        assert_eq!(id.short(), "draft-");
    }
}
