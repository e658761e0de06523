use crate::core::upload::{slugify, validate_files, FileUploader};
use crate::core::wizard::{FieldKind, WizardStep};
use crate::domain::model::{
    buckets, tables, ContactForm, ContactSubmission, JobApplication, JobForm,
    NewsletterSubscription, PartnerApplication, PartnerForm, SubmissionReceipt,
    SubscriptionOutcome, UploadFile, UploadedObject, VendorApplication, VendorForm,
    DOCUMENT_TYPES, MB, RESUME_TYPES,
};
use crate::domain::ports::Backend;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{validate_email, validate_max_length, validate_required};
use serde::Serialize;

pub const VENDOR_FORM_ID: &str = "vendor-application";

pub const MAX_DOCUMENTS: usize = 5;
pub const MAX_DOCUMENT_SIZE: u64 = 10 * MB;
pub const MAX_RESUME_SIZE: u64 = 5 * MB;

/// Vendor application 的步驟
pub fn vendor_application_steps() -> Vec<WizardStep> {
    vec![
        WizardStep::new(
            "business",
            "Business Information",
            &["business_name", "owner_name"],
        )
        .with_kinds(&[
            ("business_name", FieldKind::Text),
            ("owner_name", FieldKind::Text),
            ("years_in_business", FieldKind::Number),
            ("description", FieldKind::Text),
        ]),
        WizardStep::new(
            "contact",
            "Contact Details",
            &["email", "phone", "address", "city"],
        )
        .with_kinds(&[
            ("email", FieldKind::Text),
            ("phone", FieldKind::Text),
            ("address", FieldKind::Text),
            ("city", FieldKind::Text),
        ]),
        WizardStep::new("kitchen", "Kitchen & Menu", &["cuisine_types"])
            .with_kinds(&[("cuisine_types", FieldKind::List)]),
        WizardStep::new("documents", "Documents", &[]),
        WizardStep::new("review", "Review & Submit", &[]),
    ]
}

/// Upload limits applied to application documents.
#[derive(Debug, Clone, Copy)]
pub struct DocumentLimits {
    pub max_size_bytes: u64,
    pub max_count: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_DOCUMENT_SIZE,
            max_count: MAX_DOCUMENTS,
        }
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_duplicate(err: &SiteError) -> bool {
    match err {
        SiteError::BackendError { status, message } => {
            *status == 409 || message.contains("23505") || message.contains("duplicate key")
        }
        _ => false,
    }
}

/// 送出表單：驗證、上傳附件、寫入資料表
#[derive(Debug, Clone)]
pub struct SubmissionService<B: Backend + Clone> {
    backend: B,
    uploader: FileUploader<B>,
    limits: DocumentLimits,
}

impl<B: Backend + Clone> SubmissionService<B> {
    pub fn new(backend: B) -> Self {
        Self {
            uploader: FileUploader::new(backend.clone()),
            backend,
            limits: DocumentLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: DocumentLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn uploader(&self) -> &FileUploader<B> {
        &self.uploader
    }

    async fn insert_row<T: Serialize>(&self, table: &str, row: &T) -> Result<serde_json::Value> {
        let payload = serde_json::to_value(row)?;
        match self.backend.insert(table, payload).await {
            Ok(stored) => {
                tracing::info!("✅ Saved submission to {}", table);
                Ok(stored)
            }
            Err(e) => {
                tracing::error!("❌ Insert into {} failed: {}", table, e);
                Err(e)
            }
        }
    }

    /// 上傳附件；失敗的檔案轉成警告，不阻擋送出
    async fn upload_attachments(
        &self,
        bucket: &str,
        files: &[UploadFile],
        path: &str,
        prefix: &str,
        receipt_warnings: &mut Vec<String>,
    ) -> Vec<UploadedObject> {
        let reports = self
            .uploader
            .upload_many(bucket, files, Some(path), Some(prefix))
            .await;

        let mut uploaded = Vec::new();
        for report in reports {
            match report.result {
                Ok(object) => uploaded.push(object),
                Err(e) => receipt_warnings.push(format!(
                    "{} could not be uploaded: {}",
                    report.file_name,
                    e.user_friendly_message()
                )),
            }
        }
        uploaded
    }

    pub async fn submit_contact(&self, form: ContactForm) -> Result<SubmissionReceipt> {
        validate_required("name", "Name", &form.name)?;
        validate_email("email", &form.email)?;
        validate_required("subject", "Subject", &form.subject)?;
        validate_max_length("subject", "Subject", &form.subject, 200)?;
        validate_required("message", "Message", &form.message)?;
        validate_max_length("message", "Message", &form.message, 5000)?;

        let row = ContactSubmission {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: non_blank(form.phone),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            created_at: now(),
        };

        let stored = self.insert_row(tables::CONTACT_SUBMISSIONS, &row).await?;
        Ok(SubmissionReceipt::new(tables::CONTACT_SUBMISSIONS, stored))
    }

    pub async fn subscribe_newsletter(
        &self,
        email: &str,
        source: Option<&str>,
    ) -> Result<SubscriptionOutcome> {
        validate_email("email", email)?;

        let row = NewsletterSubscription {
            email: email.trim().to_lowercase(),
            source: non_blank(source.map(str::to_string)),
            subscribed_at: now(),
        };

        match self.backend.insert(tables::NEWSLETTER_SUBSCRIPTIONS, serde_json::to_value(&row)?).await {
            Ok(_) => {
                tracing::info!("✅ Subscribed {} to the newsletter", row.email);
                Ok(SubscriptionOutcome::Subscribed)
            }
            Err(e) if is_duplicate(&e) => {
                tracing::info!("{} is already subscribed", row.email);
                Ok(SubscriptionOutcome::AlreadySubscribed)
            }
            Err(e) => {
                tracing::error!("❌ Newsletter subscription failed: {}", e);
                Err(e)
            }
        }
    }

    pub async fn submit_partner_application(
        &self,
        form: PartnerForm,
        documents: Vec<UploadFile>,
    ) -> Result<SubmissionReceipt> {
        validate_required("business_name", "Business name", &form.business_name)?;
        validate_required("contact_name", "Contact name", &form.contact_name)?;
        validate_email("email", &form.email)?;
        validate_required("phone", "Phone", &form.phone)?;
        validate_required("business_type", "Business type", &form.business_type)?;
        validate_required("location", "Location", &form.location)?;
        validate_files(
            &documents,
            &DOCUMENT_TYPES,
            self.limits.max_size_bytes,
            self.limits.max_count,
        )?;

        let mut warnings = Vec::new();
        let uploaded = self
            .upload_attachments(
                buckets::PARTNER_APPLICATIONS,
                &documents,
                &slugify(&form.business_name),
                "document",
                &mut warnings,
            )
            .await;

        let row = PartnerApplication {
            business_name: form.business_name.trim().to_string(),
            contact_name: form.contact_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            business_type: form.business_type.trim().to_string(),
            location: form.location.trim().to_string(),
            message: non_blank(form.message),
            document_urls: uploaded.iter().map(|o| o.public_url.clone()).collect(),
            created_at: now(),
        };

        let stored = self.insert_row(tables::PARTNER_APPLICATIONS, &row).await?;
        let mut receipt = SubmissionReceipt::new(tables::PARTNER_APPLICATIONS, stored);
        receipt.uploaded = uploaded;
        receipt.warnings = warnings;
        Ok(receipt)
    }

    pub async fn submit_vendor_application(
        &self,
        form: VendorForm,
        license: Option<UploadFile>,
        menus: Vec<UploadFile>,
    ) -> Result<SubmissionReceipt> {
        validate_required("business_name", "Business name", &form.business_name)?;
        validate_required("owner_name", "Owner name", &form.owner_name)?;
        validate_email("email", &form.email)?;
        validate_required("phone", "Phone", &form.phone)?;
        validate_required("address", "Address", &form.address)?;
        validate_required("city", "City", &form.city)?;
        if form.cuisine_types.iter().all(|c| c.trim().is_empty()) {
            return Err(SiteError::validation(
                "cuisine_types",
                "Select at least one cuisine type",
            ));
        }

        let license_files: Vec<UploadFile> = license.into_iter().collect();
        validate_files(&license_files, &DOCUMENT_TYPES, self.limits.max_size_bytes, 1)?;
        validate_files(
            &menus,
            &DOCUMENT_TYPES,
            self.limits.max_size_bytes,
            self.limits.max_count,
        )?;

        let folder = slugify(&form.business_name);
        let mut warnings = Vec::new();
        let license_url = self
            .upload_attachments(
                buckets::VENDOR_APPLICATIONS,
                &license_files,
                &folder,
                "license",
                &mut warnings,
            )
            .await
            .into_iter()
            .next();
        let menu_objects = self
            .upload_attachments(
                buckets::VENDOR_APPLICATIONS,
                &menus,
                &folder,
                "menu",
                &mut warnings,
            )
            .await;

        let row = VendorApplication {
            business_name: form.business_name.trim().to_string(),
            owner_name: form.owner_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            address: form.address.trim().to_string(),
            city: form.city.trim().to_string(),
            cuisine_types: form
                .cuisine_types
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            years_in_business: form.years_in_business,
            description: non_blank(form.description),
            license_url: license_url.as_ref().map(|o| o.public_url.clone()),
            menu_urls: menu_objects.iter().map(|o| o.public_url.clone()).collect(),
            created_at: now(),
        };

        let stored = self.insert_row(tables::VENDOR_APPLICATIONS, &row).await?;
        let mut receipt = SubmissionReceipt::new(tables::VENDOR_APPLICATIONS, stored);
        receipt.uploaded = license_url.into_iter().chain(menu_objects).collect();
        receipt.warnings = warnings;
        Ok(receipt)
    }

    pub async fn submit_job_application(
        &self,
        form: JobForm,
        resume: Option<UploadFile>,
    ) -> Result<SubmissionReceipt> {
        validate_required("full_name", "Full name", &form.full_name)?;
        validate_email("email", &form.email)?;
        validate_required("position", "Position", &form.position)?;

        let mut warnings = Vec::new();
        let mut uploaded = Vec::new();
        if let Some(resume) = &resume {
            validate_files(
                std::slice::from_ref(resume),
                &RESUME_TYPES,
                MAX_RESUME_SIZE,
                1,
            )?;

            match self
                .uploader
                .upload(
                    buckets::JOB_APPLICATIONS,
                    resume,
                    Some(&slugify(&form.full_name)),
                    None,
                )
                .await
            {
                Ok(object) => uploaded.push(object),
                Err(e) => {
                    tracing::warn!("⚠️ Resume upload failed: {}", e);
                    warnings.push(format!(
                        "{} could not be uploaded: {}",
                        resume.name,
                        e.user_friendly_message()
                    ));
                }
            }
        }

        let row = JobApplication {
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: non_blank(form.phone),
            position: form.position.trim().to_string(),
            experience: non_blank(form.experience),
            cover_letter: non_blank(form.cover_letter),
            resume_url: uploaded.first().map(|o| o.public_url.clone()),
            created_at: now(),
        };

        let stored = self.insert_row(tables::JOB_APPLICATIONS, &row).await?;
        let mut receipt = SubmissionReceipt::new(tables::JOB_APPLICATIONS, stored);
        receipt.uploaded = uploaded;
        receipt.warnings = warnings;
        Ok(receipt)
    }
}
