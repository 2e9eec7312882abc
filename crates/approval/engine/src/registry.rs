//! Definition registry: in-memory storage for workflow definitions
//!
//! Keyed by definition id, with a name index tracking the versions saved
//! under each name. The registry never stores an invalid definition.

use approval_types::{WorkflowDefinition, WorkflowDefinitionId, WorkflowError, WorkflowResult};
use std::collections::HashMap;

/// Registry of workflow definitions
#[derive(Clone, Debug, Default)]
pub struct DefinitionRegistry {
    /// All registered definitions, keyed by id
    definitions: HashMap<WorkflowDefinitionId, WorkflowDefinition>,
    /// Index by name → definition ids, oldest first
    by_name: HashMap<String, Vec<WorkflowDefinitionId>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, validating it first
    pub fn insert(&mut self, definition: WorkflowDefinition) -> WorkflowResult<WorkflowDefinitionId> {
        definition.validate()?;

        let id = definition.id.clone();
        let name = definition.name.clone();

        if !self.definitions.contains_key(&id) {
            self.by_name.entry(name).or_default().push(id.clone());
        }
        self.definitions.insert(id.clone(), definition);

        tracing::info!(definition_id = %id, "workflow definition stored");
        Ok(id)
    }

    /// Get a definition by id
    pub fn get(&self, id: &WorkflowDefinitionId) -> WorkflowResult<&WorkflowDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| WorkflowError::DefinitionNotFound(id.clone()))
    }

    /// Get the most recently saved definition under a name
    pub fn latest_by_name(&self, name: &str) -> Option<&WorkflowDefinition> {
        self.by_name
            .get(name)
            .and_then(|ids| ids.last())
            .and_then(|id| self.definitions.get(id))
    }

    /// List all definitions
    pub fn list(&self) -> Vec<&WorkflowDefinition> {
        self.definitions.values().collect()
    }

    /// List only definitions documents may currently enter
    pub fn list_active(&self) -> Vec<&WorkflowDefinition> {
        self.definitions.values().filter(|d| d.active).collect()
    }

    pub fn contains(&self, id: &WorkflowDefinitionId) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.definitions.len()
    }

    /// Remove a definition
    pub fn remove(&mut self, id: &WorkflowDefinitionId) -> WorkflowResult<WorkflowDefinition> {
        let def = self
            .definitions
            .remove(id)
            .ok_or_else(|| WorkflowError::DefinitionNotFound(id.clone()))?;

        if let Some(ids) = self.by_name.get_mut(&def.name) {
            ids.retain(|i| i != id);
            if ids.is_empty() {
                self.by_name.remove(&def.name);
            }
        }

        tracing::info!(definition_id = %id, "workflow definition removed");
        Ok(def)
    }
}
