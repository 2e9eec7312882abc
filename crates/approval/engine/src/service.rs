//! Definition service: create / update / fetch of workflow definitions
//!
//! The service validates before every write and owns version stamping:
//! `create` stores version 1, `update` bumps the stored version and the
//! update timestamp. Persistence itself sits behind the async
//! [`DefinitionStore`] boundary; only an in-memory store ships here.

use crate::registry::DefinitionRegistry;
use approval_types::{WorkflowDefinition, WorkflowDefinitionId, WorkflowResult};
use async_trait::async_trait;
use tokio::sync::Mutex;

// ── Store boundary ───────────────────────────────────────────────────

/// Persistence boundary for workflow definitions
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn create(&self, definition: WorkflowDefinition) -> WorkflowResult<WorkflowDefinitionId>;
    async fn update(&self, definition: WorkflowDefinition) -> WorkflowResult<()>;
    async fn fetch_by_uuid(&self, id: &WorkflowDefinitionId) -> WorkflowResult<WorkflowDefinition>;
}

/// In-memory store backed by a [`DefinitionRegistry`]
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    registry: Mutex<DefinitionRegistry>,
}

impl InMemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DefinitionStore for InMemoryDefinitionStore {
    async fn create(&self, definition: WorkflowDefinition) -> WorkflowResult<WorkflowDefinitionId> {
        let mut registry = self.registry.lock().await;
        registry.insert(definition)
    }

    async fn update(&self, definition: WorkflowDefinition) -> WorkflowResult<()> {
        let mut registry = self.registry.lock().await;
        // Existence check keeps update from silently becoming create
        registry.get(&definition.id)?;
        registry.insert(definition)?;
        Ok(())
    }

    async fn fetch_by_uuid(&self, id: &WorkflowDefinitionId) -> WorkflowResult<WorkflowDefinition> {
        let registry = self.registry.lock().await;
        registry.get(id).cloned()
    }
}

// ── Service ──────────────────────────────────────────────────────────

/// Create / update / fetch of named, versioned workflow definitions
#[derive(Debug)]
pub struct DefinitionService<S> {
    store: S,
}

impl<S: DefinitionStore> DefinitionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a new definition at version 1
    pub async fn create(
        &self,
        mut definition: WorkflowDefinition,
    ) -> WorkflowResult<WorkflowDefinitionId> {
        definition.validate()?;
        definition.version = 1;
        definition.updated_at = chrono::Utc::now();

        let id = self.store.create(definition).await?;
        tracing::info!(definition_id = %id, "workflow definition created");
        Ok(id)
    }

    /// Persist changes to an existing definition, bumping its version
    pub async fn update(&self, mut definition: WorkflowDefinition) -> WorkflowResult<()> {
        definition.validate()?;

        let existing = self.store.fetch_by_uuid(&definition.id).await?;
        definition.version = existing.version + 1;
        definition.created_at = existing.created_at;
        definition.updated_at = chrono::Utc::now();

        let id = definition.id.clone();
        let version = definition.version;
        self.store.update(definition).await?;
        tracing::info!(definition_id = %id, version, "workflow definition updated");
        Ok(())
    }

    /// Fetch a definition by its uuid
    pub async fn fetch_by_uuid(
        &self,
        id: &WorkflowDefinitionId,
    ) -> WorkflowResult<WorkflowDefinition> {
        self.store.fetch_by_uuid(id).await
    }
}
