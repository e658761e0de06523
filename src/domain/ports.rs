use crate::domain::model::{BucketSpec, UploadFile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 草稿的 key-value 儲存，最後寫入者勝出
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn set(&self, key: &str, value: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn backend_url(&self) -> &str;
    fn anon_key(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn max_file_size_bytes(&self) -> u64;
    fn max_files(&self) -> usize;
}

/// The hosted backend: row inserts and object storage.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Inserts a single row and returns the stored representation.
    async fn insert(&self, table: &str, row: serde_json::Value) -> Result<serde_json::Value>;

    /// Uploads one object. A missing bucket is reported as `SiteError::BucketNotFound`.
    async fn upload_object(&self, bucket: &str, path: &str, file: &UploadFile) -> Result<()>;

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<()>;

    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn ping(&self) -> Result<()>;
}
