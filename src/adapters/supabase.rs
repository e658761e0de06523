use crate::domain::model::{BucketSpec, UploadFile};
use crate::domain::ports::{Backend, ConfigProvider};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

const CACHE_CONTROL: &str = "max-age=3600";

/// REST + Storage client for a Supabase-style project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        if config.backend_url().is_empty() {
            return Err(SiteError::MissingConfigError {
                field: "SUPABASE_URL".to_string(),
            });
        }
        if config.anon_key().is_empty() {
            return Err(SiteError::MissingConfigError {
                field: "SUPABASE_ANON_KEY".to_string(),
            });
        }
        Self::new(
            config.backend_url(),
            config.anon_key(),
            config.request_timeout_seconds(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn storage_url(&self, suffix: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, suffix)
    }

    /// 從錯誤回應取出訊息（message / error / 原始內容）
    async fn read_error(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| {
                ["message", "error", "details"]
                    .iter()
                    .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .unwrap_or(body);

        (status, message)
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn insert(&self, table: &str, row: serde_json::Value) -> Result<serde_json::Value> {
        tracing::debug!("Inserting row into {}", table);

        let response = self
            .authorized(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = Self::read_error(response).await;
            tracing::debug!("Insert into {} failed ({}): {}", table, status, message);
            return Err(SiteError::BackendError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(row);
        }

        // PostgREST 回傳陣列
        match serde_json::from_str::<serde_json::Value>(&body)? {
            serde_json::Value::Array(mut rows) if !rows.is_empty() => Ok(rows.swap_remove(0)),
            serde_json::Value::Array(_) => Ok(row),
            other => Ok(other),
        }
    }

    async fn upload_object(&self, bucket: &str, path: &str, file: &UploadFile) -> Result<()> {
        tracing::debug!(
            "Uploading {} ({} bytes, {}) to {}/{}",
            file.name,
            file.size(),
            file.content_type,
            bucket,
            path
        );

        let response = self
            .authorized(
                self.client
                    .post(self.storage_url(&format!("object/{}/{}", bucket, path))),
            )
            .header("Content-Type", &file.content_type)
            .header("cache-control", CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(file.bytes.clone())
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, message) = Self::read_error(response).await;
        if status == StatusCode::NOT_FOUND || message.to_lowercase().contains("not found") {
            return Err(SiteError::BucketNotFound {
                bucket: bucket.to_string(),
            });
        }

        Err(SiteError::StorageError {
            bucket: bucket.to_string(),
            message: format!("{} ({})", message, status.as_u16()),
        })
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<()> {
        tracing::info!("🪣 Creating bucket {}", spec.id);

        let response = self
            .authorized(self.client.post(self.storage_url("bucket")))
            .json(spec)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, message) = Self::read_error(response).await;
        if status == StatusCode::CONFLICT || message.to_lowercase().contains("already exists") {
            tracing::debug!("Bucket {} already exists", spec.id);
            return Ok(());
        }

        Err(SiteError::StorageError {
            bucket: spec.id.clone(),
            message: format!("could not create bucket: {} ({})", message, status.as_u16()),
        })
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let response = self
            .authorized(self.client.get(self.storage_url(&format!("bucket/{}", bucket))))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(true);
        }

        let (status, message) = Self::read_error(response).await;
        if status == StatusCode::NOT_FOUND || message.to_lowercase().contains("not found") {
            return Ok(false);
        }

        Err(SiteError::StorageError {
            bucket: bucket.to_string(),
            message: format!("{} ({})", message, status.as_u16()),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.storage_url(&format!("object/public/{}/{}", bucket, path))
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .authorized(self.client.get(format!("{}/rest/v1/", self.base_url)))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, message) = Self::read_error(response).await;
        Err(SiteError::BackendError {
            status: status.as_u16(),
            message,
        })
    }
}
