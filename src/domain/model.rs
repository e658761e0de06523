use serde::{Deserialize, Serialize};

/// 後端資料表名稱（底線命名）
pub mod tables {
    pub const CONTACT_SUBMISSIONS: &str = "contact_submissions";
    pub const NEWSLETTER_SUBSCRIPTIONS: &str = "newsletter_subscriptions";
    pub const PARTNER_APPLICATIONS: &str = "partner_applications";
    pub const VENDOR_APPLICATIONS: &str = "vendor_applications";
    pub const JOB_APPLICATIONS: &str = "job_applications";
}

/// 儲存空間 bucket 名稱（連字號命名）
pub mod buckets {
    pub const PARTNER_APPLICATIONS: &str = "partner-applications";
    pub const VENDOR_APPLICATIONS: &str = "vendor-applications";
    pub const JOB_APPLICATIONS: &str = "job-applications";
    pub const TEST_UPLOADS: &str = "test-uploads";

    pub const ALL: [&str; 4] = [
        PARTNER_APPLICATIONS,
        VENDOR_APPLICATIONS,
        JOB_APPLICATIONS,
        TEST_UPLOADS,
    ];
}

pub const MB: u64 = 1024 * 1024;
pub const DEFAULT_BUCKET_SIZE_LIMIT: u64 = 10 * MB;

pub const DOCUMENT_TYPES: [&str; 5] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
];

pub const RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// A file picked by the user, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedObject {
    pub bucket: String,
    pub path: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketSpec {
    pub id: String,
    pub name: String,
    pub public: bool,
    pub file_size_limit: u64,
}

impl BucketSpec {
    pub fn public(name: &str, file_size_limit: u64) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
            public: true,
            file_size_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub subscribed_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerApplication {
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub business_type: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub document_urls: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorApplication {
    pub business_name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_in_business: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(default)]
    pub menu_urls: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    pub created_at: String,
}

/// 表單輸入（尚未加上時間戳與檔案網址）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerForm {
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub business_type: String,
    pub location: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Vendor wizard 合併後的欄位
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorForm {
    pub business_name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    #[serde(default)]
    pub years_in_business: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobForm {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub position: String,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    Subscribed,
    AlreadySubscribed,
}

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub table: String,
    pub row: serde_json::Value,
    pub uploaded: Vec<UploadedObject>,
    pub warnings: Vec<String>,
}

impl SubmissionReceipt {
    pub fn new(table: &str, row: serde_json::Value) -> Self {
        Self {
            table: table.to_string(),
            row,
            uploaded: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
