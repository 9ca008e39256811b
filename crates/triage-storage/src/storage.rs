//! 快照存储管理

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use triage_core::Result;
use triage_workflow::WorkflowSnapshot;

/// 快照存储接口
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 保存快照，覆盖上一份
    async fn save(&self, snapshot: &WorkflowSnapshot) -> Result<()>;

    /// 读取最近一次保存的快照，尚未保存过则返回 `None`
    async fn load(&self) -> Result<Option<WorkflowSnapshot>>;
}

/// JSON 文件存储
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn save(&self, snapshot: &WorkflowSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(snapshot)?;

        // 先写临时文件再改名，避免留下半截快照
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            patients = snapshot.patients.len(),
            "Saved workflow snapshot"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Option<WorkflowSnapshot>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No snapshot found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: WorkflowSnapshot = serde_json::from_slice(&data)?;
        tracing::debug!(
            path = %self.path.display(),
            taken_at = %snapshot.taken_at,
            "Loaded workflow snapshot"
        );
        Ok(Some(snapshot))
    }
}

/// 内存存储，用于测试和禁用持久化的场景
#[derive(Debug, Default)]
pub struct MemoryStore {
    latest: RwLock<Option<WorkflowSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, snapshot: &WorkflowSnapshot) -> Result<()> {
        let mut latest = self.latest.write().await;
        *latest = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<WorkflowSnapshot>> {
        Ok(self.latest.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Department, Patient, PriorityTier, TriageError};
    use triage_workflow::{TieBreakPolicy, TriageWorkflow};

    fn sample_workflow() -> TriageWorkflow {
        let mut workflow = TriageWorkflow::new(TieBreakPolicy::Lifo);
        workflow.admit(Patient::new("Bob", "61", "Arrhythmia", Department::Cardiology, PriorityTier::Routine));
        workflow.admit(Patient::new("Alice", "7", "Seizure", Department::Neurology, PriorityTier::Emergency));
        workflow.dispatch_next().unwrap();
        workflow
    }

    #[tokio::test]
    async fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state").join("triage.json"));

        assert!(store.load().await.unwrap().is_none());

        let workflow = sample_workflow();
        let snapshot = workflow.snapshot();
        store.save(&snapshot).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!store.temp_path().exists());

        let restored = TriageWorkflow::from_snapshot(TieBreakPolicy::Lifo, loaded).unwrap();
        assert_eq!(restored.stats(), workflow.stats());
    }

    #[tokio::test]
    async fn test_json_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load().await, Err(TriageError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_memory_store_keeps_latest() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&WorkflowSnapshot::empty()).await.unwrap();
        let snapshot = sample_workflow().snapshot();
        store.save(&snapshot).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(snapshot));
    }
}
