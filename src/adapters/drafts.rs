use crate::domain::ports::DraftStore;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 每個草稿一個 JSON 檔，放在指定目錄下
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    base_path: PathBuf,
}

impl FileDraftStore {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// 檔名為 form-urlencoded 的 key，不同 key 不會對應到同一個檔案
    fn slot_path(&self, key: &str) -> PathBuf {
        let file_name: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        self.base_path.join(format!("{}.json", file_name))
    }
}

impl DraftStore for FileDraftStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        tokio::fs::write(self.slot_path(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.slot_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DraftStore for MemoryDraftStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.lock().map_err(|e| crate::utils::error::SiteError::Unknown {
            message: format!("draft store lock poisoned: {}", e),
        })?;
        Ok(slots.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|e| crate::utils::error::SiteError::Unknown {
            message: format!("draft store lock poisoned: {}", e),
        })?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|e| crate::utils::error::SiteError::Unknown {
            message: format!("draft store lock poisoned: {}", e),
        })?;
        slots.remove(key);
        Ok(())
    }
}
