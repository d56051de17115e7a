use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The generated file of one component as it was emitted at some revision,
/// together with the logical-id map that was in force when it was generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSkeletonModel {
    pub uuid: String,
    /// Ordered `(nameInId, uuid)` pairs, serialized as two-element arrays.
    pub name_in_id_to_uuid: Vec<(String, String)>,
    pub file_content: String,
}

impl ComponentSkeletonModel {
    pub fn new(
        uuid: impl Into<String>,
        name_in_id_to_uuid: Vec<(String, String)>,
        file_content: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            name_in_id_to_uuid,
            file_content: file_content.into(),
        }
    }

    /// The id map as a lookup table. Later duplicates win.
    pub fn id_map(&self) -> BTreeMap<String, String> {
        self.name_in_id_to_uuid.iter().cloned().collect()
    }
}

/// Everything the generator recorded for one project revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectSyncMetadataModel {
    pub components: Vec<ComponentSkeletonModel>,
}

impl ProjectSyncMetadataModel {
    pub fn new(components: Vec<ComponentSkeletonModel>) -> Self {
        Self { components }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn component(&self, uuid: &str) -> Option<&ComponentSkeletonModel> {
        self.components.iter().find(|c| c.uuid == uuid)
    }

    /// Replace the component with the same uuid, or append it.
    pub fn upsert(&mut self, component: ComponentSkeletonModel) {
        match self.components.iter_mut().find(|c| c.uuid == component.uuid) {
            Some(existing) => *existing = component,
            None => self.components.push(component),
        }
    }
}
