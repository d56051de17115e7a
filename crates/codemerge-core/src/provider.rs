use crate::error::ProviderError;
use crate::metadata::ProjectSyncMetadataModel;
use dashmap::DashMap;
use std::sync::Arc;

/// Source of the base metadata a merge compares against.
#[async_trait::async_trait]
pub trait ProjectSyncDataProvider: Send + Sync + 'static {
    /// Fetch the metadata recorded for `project_id` at `revision`.
    async fn fetch(
        &self,
        project_id: &str,
        revision: u64,
    ) -> Result<Arc<ProjectSyncMetadataModel>, ProviderError>;
}

#[async_trait::async_trait]
impl<P: ProjectSyncDataProvider + ?Sized> ProjectSyncDataProvider for Arc<P> {
    async fn fetch(
        &self,
        project_id: &str,
        revision: u64,
    ) -> Result<Arc<ProjectSyncMetadataModel>, ProviderError> {
        (**self).fetch(project_id, revision).await
    }
}

/// Memoizes successful fetches per `(project_id, revision)`.
/// Failures are not cached, so a later call retries.
pub struct CachedProvider<P> {
    inner: P,
    cache: DashMap<(String, u64), Arc<ProjectSyncMetadataModel>>,
}

impl<P: ProjectSyncDataProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait::async_trait]
impl<P: ProjectSyncDataProvider> ProjectSyncDataProvider for CachedProvider<P> {
    async fn fetch(
        &self,
        project_id: &str,
        revision: u64,
    ) -> Result<Arc<ProjectSyncMetadataModel>, ProviderError> {
        let key = (project_id.to_string(), revision);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.value().clone());
        }
        let model = self.inner.fetch(project_id, revision).await?;
        tracing::debug!(project_id, revision, "cached sync metadata");
        self.cache.insert(key, model.clone());
        Ok(model)
    }
}

/// Serves the same in-memory model for every project and revision.
pub struct StaticProvider {
    model: Arc<ProjectSyncMetadataModel>,
}

impl StaticProvider {
    pub fn new(model: ProjectSyncMetadataModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

#[async_trait::async_trait]
impl ProjectSyncDataProvider for StaticProvider {
    async fn fetch(
        &self,
        _project_id: &str,
        _revision: u64,
    ) -> Result<Arc<ProjectSyncMetadataModel>, ProviderError> {
        Ok(self.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ComponentSkeletonModel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fails the first call, then counts successful fetches.
    struct Flaky {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, u64)>>,
    }

    #[async_trait::async_trait]
    impl ProjectSyncDataProvider for Flaky {
        async fn fetch(
            &self,
            project_id: &str,
            revision: u64,
        ) -> Result<Arc<ProjectSyncMetadataModel>, ProviderError> {
            self.seen
                .lock()
                .unwrap()
                .push((project_id.to_string(), revision));
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ProviderError::Other("offline".into()));
            }
            Ok(Arc::new(ProjectSyncMetadataModel::new(vec![
                ComponentSkeletonModel::new("c1", vec![], format!("rev {}", revision)),
            ])))
        }
    }

    #[tokio::test]
    async fn test_cache_skips_failures_and_memoizes_hits() {
        let provider = CachedProvider::new(Flaky {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        });

        assert!(provider.fetch("p", 3).await.is_err());
        assert_eq!(provider.cached_entries(), 0);

        let first = provider.fetch("p", 3).await.unwrap();
        let second = provider.fetch("p", 3).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.component("c1").unwrap().file_content, "rev 3");

        provider.fetch("p", 4).await.unwrap();
        assert_eq!(provider.cached_entries(), 2);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            provider.inner.seen.lock().unwrap().last().cloned(),
            Some(("p".to_string(), 4))
        );
    }

    #[tokio::test]
    async fn test_static_provider_ignores_revision() {
        let provider = StaticProvider::new(ProjectSyncMetadataModel::default());
        let a = provider.fetch("x", 1).await.unwrap();
        let b = provider.fetch("y", 9).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
