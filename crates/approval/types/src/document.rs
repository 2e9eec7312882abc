//! Document-side types referenced by the engine
//!
//! The concrete business document (order, payment, …) lives outside this
//! workspace. The engine only needs its identity and its approval status.

use serde::{Deserialize, Serialize};

/// Unique identifier for a document moving through a workflow
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
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

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Approval status of a document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Waiting on one or more steps
    #[default]
    Pending,
    /// Every step's consensus was satisfied
    Approved,
    /// Rejected at some step; no further transitions are accepted
    Rejected,
}

impl DocumentStatus {
    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}
