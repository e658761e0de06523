use crate::domain::ports::DraftStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const KEY_PREFIX: &str = "form_progress";

/// 表單草稿快取：儲存、還原、清除
///
/// 所有錯誤只記錄 log，呼叫端永遠拿得到可用的值。
#[derive(Debug, Clone)]
pub struct FormProgressCache<S: DraftStore> {
    store: S,
}

impl<S: DraftStore> FormProgressCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn slot_key(form_id: &str) -> String {
        format!("{}:{}", KEY_PREFIX, form_id)
    }

    pub async fn save<T: Serialize>(&self, form_id: &str, values: &T) {
        let serialized = match serde_json::to_string(values) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!("⚠️ Could not serialize progress for {}: {}", form_id, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&Self::slot_key(form_id), &serialized).await {
            tracing::warn!("⚠️ Could not save progress for {}: {}", form_id, e);
        } else {
            tracing::debug!("Saved progress for {} ({} bytes)", form_id, serialized.len());
        }
    }

    /// 讀取草稿並覆蓋在預設值上；沒有草稿或格式錯誤時回傳預設值
    pub async fn load<T: Serialize + DeserializeOwned>(&self, form_id: &str, defaults: T) -> T {
        let stored = match self.store.get(&Self::slot_key(form_id)).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return defaults,
            Err(e) => {
                tracing::warn!("⚠️ Could not read progress for {}: {}", form_id, e);
                return defaults;
            }
        };

        let saved: serde_json::Value = match serde_json::from_str(&stored) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("⚠️ Discarding malformed progress for {}: {}", form_id, e);
                return defaults;
            }
        };

        let merged = match serde_json::to_value(&defaults) {
            Ok(serde_json::Value::Object(mut base)) => match saved {
                serde_json::Value::Object(overrides) => {
                    base.extend(overrides);
                    serde_json::Value::Object(base)
                }
                other => other,
            },
            Ok(_) => saved,
            Err(e) => {
                tracing::warn!("⚠️ Could not serialize defaults for {}: {}", form_id, e);
                return defaults;
            }
        };

        match serde_json::from_value(merged) {
            Ok(values) => {
                tracing::debug!("Restored progress for {}", form_id);
                values
            }
            Err(e) => {
                tracing::warn!("⚠️ Stored progress for {} does not fit the form: {}", form_id, e);
                defaults
            }
        }
    }

    pub async fn clear(&self, form_id: &str) {
        if let Err(e) = self.store.remove(&Self::slot_key(form_id)).await {
            tracing::warn!("⚠️ Could not clear progress for {}: {}", form_id, e);
        }
    }

    pub async fn has_draft(&self, form_id: &str) -> bool {
        matches!(self.store.get(&Self::slot_key(form_id)).await, Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryDraftStore;
    use crate::domain::model::ContactForm;
    use crate::utils::error::{Result, SiteError};
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct NewsletterDraft {
        email: String,
        frequency: String,
        topics: Vec<String>,
    }

    struct BrokenStore;

    impl DraftStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(SiteError::Unknown {
                message: "storage disabled".to_string(),
            })
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(SiteError::Unknown {
                message: "quota exceeded".to_string(),
            })
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(SiteError::Unknown {
                message: "storage disabled".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let cache = FormProgressCache::new(MemoryDraftStore::new());
        let form = ContactForm {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            subject: "Question".to_string(),
            message: "Hello".to_string(),
        };

        cache.save("contact", &form).await;
        let restored = cache.load("contact", ContactForm::default()).await;

        assert_eq!(restored, form);
    }

    #[tokio::test]
    async fn test_load_never_saved_returns_defaults() {
        let cache = FormProgressCache::new(MemoryDraftStore::new());
        let defaults = NewsletterDraft {
            email: String::new(),
            frequency: "weekly".to_string(),
            topics: vec!["recipes".to_string()],
        };

        let loaded = cache.load("newsletter", defaults.clone()).await;
        assert_eq!(loaded, defaults);
    }

    #[tokio::test]
    async fn test_load_merges_partial_draft_over_defaults() {
        let store = MemoryDraftStore::new();
        store
            .set("form_progress:newsletter", r#"{"email":"jane@example.com"}"#)
            .await
            .unwrap();
        let cache = FormProgressCache::new(store);

        let loaded = cache
            .load(
                "newsletter",
                NewsletterDraft {
                    email: String::new(),
                    frequency: "weekly".to_string(),
                    topics: vec![],
                },
            )
            .await;

        assert_eq!(loaded.email, "jane@example.com");
        assert_eq!(loaded.frequency, "weekly");
    }

    #[tokio::test]
    async fn test_malformed_draft_falls_back_to_defaults() {
        let store = MemoryDraftStore::new();
        store.set("form_progress:contact", "{not json").await.unwrap();
        let cache = FormProgressCache::new(store.clone());

        let loaded = cache.load("contact", ContactForm::default()).await;
        assert_eq!(loaded, ContactForm::default());

        // 型別不符也退回預設值
        store
            .set("form_progress:contact", r#"{"name": 42}"#)
            .await
            .unwrap();
        let loaded = cache.load("contact", ContactForm::default()).await;
        assert_eq!(loaded, ContactForm::default());
    }

    #[tokio::test]
    async fn test_clear_removes_slot() {
        let store = MemoryDraftStore::new();
        let cache = FormProgressCache::new(store.clone());

        cache.save("contact", &ContactForm::default()).await;
        assert!(cache.has_draft("contact").await);

        cache.clear("contact").await;
        assert!(!cache.has_draft("contact").await);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_storage_errors_are_swallowed() {
        let cache = FormProgressCache::new(BrokenStore);

        cache.save("contact", &ContactForm::default()).await;
        cache.clear("contact").await;
        let loaded = cache.load("contact", ContactForm::default()).await;

        assert_eq!(loaded, ContactForm::default());
        assert!(!cache.has_draft("contact").await);
    }
}
