use crate::error::ProviderError;
use crate::metadata::{ComponentSkeletonModel, ProjectSyncMetadataModel};
use crate::provider::ProjectSyncDataProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Filesystem-backed metadata, one JSON file per project revision:
/// `<root>/<project_id>/<revision>.json`.
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, project_id: &str, revision: u64) -> PathBuf {
        self.root
            .join(project_id)
            .join(format!("{}.json", revision))
    }

    pub async fn load(
        &self,
        project_id: &str,
        revision: u64,
    ) -> Result<ProjectSyncMetadataModel, ProviderError> {
        let path = self.path_for(project_id, revision);
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::NotFound {
                    project_id: project_id.to_string(),
                    revision,
                });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(ProjectSyncMetadataModel::from_json(&content)?)
    }

    /// Write the model using tmp+rename so readers never see a partial file.
    pub async fn save(
        &self,
        project_id: &str,
        revision: u64,
        model: &ProjectSyncMetadataModel,
    ) -> Result<(), ProviderError> {
        let path = self.path_for(project_id, revision);
        let dir = self.root.join(project_id);
        fs::create_dir_all(&dir).await?;
        let tmp = dir.join(format!(".{}.json.tmp", revision));
        fs::write(&tmp, model.to_json()?).await?;
        fs::rename(&tmp, &path).await?;
        tracing::debug!(path = %path.display(), "saved sync metadata");
        Ok(())
    }

    /// Upsert one component into the stored revision, creating it if needed.
    pub async fn record(
        &self,
        project_id: &str,
        revision: u64,
        component: ComponentSkeletonModel,
    ) -> Result<(), ProviderError> {
        let mut model = match self.load(project_id, revision).await {
            Ok(m) => m,
            Err(ProviderError::NotFound { .. }) => ProjectSyncMetadataModel::default(),
            Err(e) => return Err(e),
        };
        model.upsert(component);
        self.save(project_id, revision, &model).await
    }
}

#[async_trait::async_trait]
impl ProjectSyncDataProvider for MetadataStore {
    async fn fetch(
        &self,
        project_id: &str,
        revision: u64,
    ) -> Result<Arc<ProjectSyncMetadataModel>, ProviderError> {
        Ok(Arc::new(self.load(project_id, revision).await?))
    }
}
