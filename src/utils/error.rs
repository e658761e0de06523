use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Validation failed for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Backend rejected request ({status}): {message}")]
    BackendError { status: u16, message: String },

    #[error("Storage operation failed for bucket {bucket}: {message}")]
    StorageError { bucket: String, message: String },

    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unexpected error: {message}")]
    Unknown { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Storage,
    Persistence,
    Configuration,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SiteError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage(bucket: impl Into<String>, message: impl Into<String>) -> Self {
        SiteError::StorageError {
            bucket: bucket.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::ValidationError { .. } => ErrorCategory::Validation,
            SiteError::NetworkError(_) => ErrorCategory::Network,
            SiteError::StorageError { .. } | SiteError::BucketNotFound { .. } => {
                ErrorCategory::Storage
            }
            SiteError::BackendError { .. } => ErrorCategory::Persistence,
            SiteError::ConfigError { .. }
            | SiteError::MissingConfigError { .. }
            | SiteError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SiteError::IoError(_) | SiteError::SerializationError(_) | SiteError::Unknown { .. } => {
                ErrorCategory::Unknown
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 上傳失敗不阻擋表單送出
            ErrorCategory::Storage => ErrorSeverity::Low,
            ErrorCategory::Validation | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Persistence | ErrorCategory::Unknown => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 給使用者看的訊息，持久化錯誤只回傳通用文字
    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::ValidationError { message, .. } => message.clone(),
            SiteError::NetworkError(_) => {
                "We couldn't reach the server. Please check your connection and try again.".to_string()
            }
            SiteError::BackendError { .. } => {
                "Something went wrong while saving your submission. Please try again later."
                    .to_string()
            }
            SiteError::StorageError { .. } | SiteError::BucketNotFound { .. } => {
                "One of your files could not be uploaded.".to_string()
            }
            SiteError::MissingConfigError { field } => {
                format!("The site is not configured: {} is missing.", field)
            }
            SiteError::ConfigError { message } => format!("Configuration problem: {}", message),
            SiteError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting {}: {}", field, reason)
            }
            SiteError::IoError(_) | SiteError::SerializationError(_) | SiteError::Unknown { .. } => {
                "An unexpected error occurred.".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Correct the highlighted field and submit again.",
            ErrorCategory::Network => "Check network connectivity and the backend URL.",
            ErrorCategory::Storage => {
                "Check the file type and size, or submit without the attachment."
            }
            ErrorCategory::Persistence => "Run `meal-leads check` to verify the backend tables.",
            ErrorCategory::Configuration => {
                "Set SUPABASE_URL and SUPABASE_ANON_KEY or provide a site.toml."
            }
            ErrorCategory::Unknown => "Re-run with --verbose and inspect the log output.",
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_severity() {
        let err = SiteError::validation("email", "Please enter a valid email address");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "Please enter a valid email address");

        let err = SiteError::BucketNotFound {
            bucket: "partner-applications".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Low);

        let err = SiteError::MissingConfigError {
            field: "SUPABASE_URL".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_backend_error_message_is_generic() {
        let err = SiteError::BackendError {
            status: 500,
            message: "relation \"contact_submissions\" does not exist".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Persistence);
        assert!(!err.user_friendly_message().contains("relation"));
    }
}
