use crate::domain::model::{BucketSpec, UploadFile, UploadedObject, DEFAULT_BUCKET_SIZE_LIMIT, MB};
use crate::domain::ports::Backend;
use crate::utils::error::{Result, SiteError};

/// 檢查檔案數量、類型與大小；遇到第一個違規就回傳
pub fn validate_files(
    files: &[UploadFile],
    allowed_types: &[&str],
    max_size_bytes: u64,
    max_count: usize,
) -> Result<()> {
    if files.len() > max_count {
        return Err(SiteError::validation(
            "files",
            format!("Maximum {} files allowed", max_count),
        ));
    }

    for file in files {
        if !allowed_types.is_empty() && !allowed_types.contains(&file.content_type.as_str()) {
            return Err(SiteError::validation(
                "files",
                format!(
                    "File type {} is not allowed. Allowed types: {}",
                    file.content_type,
                    allowed_types.join(", ")
                ),
            ));
        }

        if file.size() > max_size_bytes {
            return Err(SiteError::validation(
                "files",
                format!(
                    "File {} exceeds the maximum size of {}",
                    file.name,
                    format_megabytes(max_size_bytes)
                ),
            ));
        }
    }

    Ok(())
}

pub fn format_megabytes(bytes: u64) -> String {
    if bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    }
}

pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// 把商家名稱轉成儲存路徑用的 slug
pub fn slugify(value: &str) -> String {
    let mut slug = String::new();
    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}

#[derive(Debug)]
pub struct UploadReport {
    pub file_name: String,
    pub result: Result<UploadedObject>,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn uploaded(&self) -> Option<&UploadedObject> {
        self.result.as_ref().ok()
    }

    pub fn error_message(&self) -> Option<String> {
        self.result.as_ref().err().map(|e| e.to_string())
    }
}

/// Uploads files to the backend's object storage, creating missing buckets.
#[derive(Debug, Clone)]
pub struct FileUploader<B: Backend> {
    backend: B,
    bucket_size_limit: u64,
}

impl<B: Backend> FileUploader<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            bucket_size_limit: DEFAULT_BUCKET_SIZE_LIMIT,
        }
    }

    pub fn with_bucket_size_limit(mut self, bytes: u64) -> Self {
        self.bucket_size_limit = bytes;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 確認 bucket 存在，不存在就建立。回傳是否新建。
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<bool> {
        if self.backend.bucket_exists(bucket).await? {
            return Ok(false);
        }
        self.backend
            .create_bucket(&BucketSpec::public(bucket, self.bucket_size_limit))
            .await?;
        Ok(true)
    }

    /// 單次上傳；bucket 不存在時建立後重試一次，網路錯誤不重試
    pub async fn upload(
        &self,
        bucket: &str,
        file: &UploadFile,
        path: Option<&str>,
        name: Option<&str>,
    ) -> Result<UploadedObject> {
        let object_name = match name {
            Some(name) => sanitize_file_name(name),
            None => format!(
                "{}-{}",
                chrono::Utc::now().timestamp_millis(),
                sanitize_file_name(&file.name)
            ),
        };
        let object_path = match path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
            Some(prefix) => format!("{}/{}", prefix, object_name),
            None => object_name,
        };

        match self.backend.upload_object(bucket, &object_path, file).await {
            Ok(()) => {}
            Err(SiteError::BucketNotFound { .. }) => {
                tracing::warn!("⚠️ Bucket {} not found, creating it", bucket);
                self.backend
                    .create_bucket(&BucketSpec::public(bucket, self.bucket_size_limit))
                    .await?;
                self.backend.upload_object(bucket, &object_path, file).await?;
            }
            Err(e) => return Err(e),
        }

        let public_url = self.backend.public_url(bucket, &object_path);
        tracing::info!("📎 Uploaded {} to {}/{}", file.name, bucket, object_path);

        Ok(UploadedObject {
            bucket: bucket.to_string(),
            path: object_path,
            public_url,
        })
    }

    /// 逐一上傳，每個檔案一筆結果；前面成功的檔案不會回滾
    pub async fn upload_many(
        &self,
        bucket: &str,
        files: &[UploadFile],
        path: Option<&str>,
        prefix: Option<&str>,
    ) -> Vec<UploadReport> {
        let mut reports = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let timestamp = chrono::Utc::now().timestamp_millis();
            let name = match prefix {
                Some(prefix) => format!(
                    "{}-{}-{}-{}",
                    sanitize_file_name(prefix),
                    index,
                    timestamp,
                    sanitize_file_name(&file.name)
                ),
                None => format!("{}-{}-{}", index, timestamp, sanitize_file_name(&file.name)),
            };

            let result = self.upload(bucket, file, path, Some(&name)).await;
            if let Err(e) = &result {
                tracing::warn!("⚠️ Upload of {} failed: {}", file.name, e);
            }

            reports.push(UploadReport {
                file_name: file.name.clone(),
                result,
            });
        }

        let failed = reports.iter().filter(|r| !r.is_success()).count();
        tracing::debug!(
            "Batch upload to {} finished: {} succeeded, {} failed",
            bucket,
            reports.len() - failed,
            failed
        );

        reports
    }
}
