use crate::config::env::{BackendEnv, SUPABASE_ANON_KEY, SUPABASE_URL};
use crate::core::forms::DocumentLimits;
use crate::domain::model::MB;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "site.toml";
pub const DEFAULT_DRAFTS_DIR: &str = ".meal-leads/drafts";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub drafts: DraftConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size_mb: Option<u64>,
    pub max_files: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftConfig {
    pub directory: Option<String>,
}

fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with("${")
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 指定檔案 > ./site.toml > 環境變數；檔案中空白的後端欄位以環境變數補上
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env(&BackendEnv::from_env());
        Ok(config)
    }

    pub fn apply_env(&mut self, env: &BackendEnv) {
        if is_unset(&self.backend.url) {
            if let Some(url) = &env.url {
                self.backend.url = url.clone();
            }
        }
        if is_unset(&self.backend.anon_key) {
            if let Some(key) = &env.anon_key {
                self.backend.anon_key = key.clone();
            }
        }
    }

    /// 尚未設定的後端欄位（以環境變數名稱表示）
    pub fn missing_backend_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_unset(&self.backend.url) {
            missing.push(SUPABASE_URL);
        }
        if is_unset(&self.backend.anon_key) {
            missing.push(SUPABASE_ANON_KEY);
        }
        missing
    }

    pub fn is_backend_configured(&self) -> bool {
        self.missing_backend_fields().is_empty()
    }

    pub fn drafts_dir(&self) -> &str {
        self.drafts
            .directory
            .as_deref()
            .unwrap_or(DEFAULT_DRAFTS_DIR)
    }

    pub fn document_limits(&self) -> DocumentLimits {
        let defaults = DocumentLimits::default();
        DocumentLimits {
            max_size_bytes: self.max_file_size_bytes(),
            max_count: self.uploads.max_files.unwrap_or(defaults.max_count),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        if !is_unset(&self.backend.url) {
            crate::utils::validation::validate_url("backend.url", &self.backend.url)?;
        }

        crate::utils::validation::validate_path("drafts.directory", self.drafts_dir())?;

        if let Some(timeout) = self.backend.timeout_seconds {
            crate::utils::validation::validate_range("backend.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(size) = self.uploads.max_file_size_mb {
            crate::utils::validation::validate_range("uploads.max_file_size_mb", size, 1, 50)?;
        }

        if let Some(max_files) = self.uploads.max_files {
            crate::utils::validation::validate_positive_number(
                "uploads.max_files",
                max_files,
                1,
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for SiteConfig {
    fn backend_url(&self) -> &str {
        if is_unset(&self.backend.url) {
            ""
        } else {
            &self.backend.url
        }
    }

    fn anon_key(&self) -> &str {
        if is_unset(&self.backend.anon_key) {
            ""
        } else {
            &self.backend.anon_key
        }
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.backend.timeout_seconds.unwrap_or(30)
    }

    fn max_file_size_bytes(&self) -> u64 {
        self.uploads.max_file_size_mb.unwrap_or(10) * MB
    }

    fn max_files(&self) -> usize {
        self.document_limits().max_count
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[backend]
url = "https://abc.supabase.co"
anon_key = "public-anon-key"
timeout_seconds = 15

[uploads]
max_file_size_mb = 8
max_files = 3

[drafts]
directory = "/tmp/drafts"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.backend_url(), "https://abc.supabase.co");
        assert_eq!(config.request_timeout_seconds(), 15);
        assert_eq!(config.max_file_size_bytes(), 8 * MB);
        assert_eq!(config.max_files(), 3);
        assert_eq!(config.drafts_dir(), "/tmp/drafts");
        assert!(config.is_backend_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = SiteConfig::from_toml_str("").unwrap();

        assert_eq!(config.request_timeout_seconds(), 30);
        assert_eq!(config.max_file_size_bytes(), 10 * MB);
        assert_eq!(config.max_files(), 5);
        assert_eq!(config.drafts_dir(), DEFAULT_DRAFTS_DIR);
        assert_eq!(
            config.missing_backend_fields(),
            vec![SUPABASE_URL, SUPABASE_ANON_KEY]
        );
        // 缺少後端設定不是驗證錯誤
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MEAL_LEADS_TEST_URL", "https://sub.supabase.co");

        let toml_content = r#"
[backend]
url = "${MEAL_LEADS_TEST_URL}"
anon_key = "${MEAL_LEADS_TEST_UNSET_KEY}"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.backend_url(), "https://sub.supabase.co");
        assert_eq!(config.anon_key(), "");
        assert_eq!(config.missing_backend_fields(), vec![SUPABASE_ANON_KEY]);

        std::env::remove_var("MEAL_LEADS_TEST_URL");
    }

    #[test]
    fn test_apply_env_fills_blank_fields_only() {
        let mut config = SiteConfig::from_toml_str(
            r#"
[backend]
url = "https://file.supabase.co"
"#,
        )
        .unwrap();

        config.apply_env(&BackendEnv {
            url: Some("https://env.supabase.co".to_string()),
            anon_key: Some("env-key".to_string()),
        });

        assert_eq!(config.backend_url(), "https://file.supabase.co");
        assert_eq!(config.anon_key(), "env-key");
    }

    #[test]
    fn test_config_validation() {
        let config = SiteConfig::from_toml_str(
            r#"
[backend]
url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = SiteConfig::from_toml_str(
            r#"
[uploads]
max_file_size_mb = 500
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[drafts]\ndirectory = \"./my-drafts\"\n")
            .unwrap();

        let config = SiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.drafts_dir(), "./my-drafts");
    }
}
