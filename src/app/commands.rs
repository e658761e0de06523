use crate::adapters::{FileDraftStore, SupabaseClient};
use crate::config::{CliConfig, Command, SiteConfig, VendorAction};
use crate::core::diagnostics::{environment_check, Diagnostics, DiagnosticsReport};
use crate::core::forms::{vendor_application_steps, SubmissionService, VENDOR_FORM_ID};
use crate::core::progress::FormProgressCache;
use crate::core::upload::FileUploader;
use crate::core::wizard::Wizard;
use crate::domain::model::{
    ContactForm, JobForm, PartnerForm, SubmissionReceipt, SubscriptionOutcome, UploadFile,
    VendorForm,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use serde::de::DeserializeOwned;
use std::path::Path;

pub const CONTACT_FORM_ID: &str = "contact";

pub async fn run(cli: &CliConfig, config: &SiteConfig) -> Result<()> {
    match &cli.command {
        Command::Check => run_check(config).await,
        Command::Contact {
            name,
            email,
            phone,
            subject,
            message,
            discard,
        } => {
            let store = draft_store(cli, config);
            if *discard {
                FormProgressCache::new(store).clear(CONTACT_FORM_ID).await;
                println!("🗑️ Contact draft discarded");
                return Ok(());
            }
            let overrides = ContactForm {
                name: name.clone().unwrap_or_default(),
                email: email.clone().unwrap_or_default(),
                phone: phone.clone(),
                subject: subject.clone().unwrap_or_default(),
                message: message.clone().unwrap_or_default(),
            };
            run_contact(config, store, overrides).await
        }
        Command::Subscribe { email, source } => {
            let service = submission_service(config)?;
            match service.subscribe_newsletter(email, source.as_deref()).await? {
                SubscriptionOutcome::Subscribed => println!("✅ Thanks for subscribing!"),
                SubscriptionOutcome::AlreadySubscribed => {
                    println!("ℹ️ {} is already on the list", email)
                }
            }
            Ok(())
        }
        Command::Partner { form, documents } => {
            let form: PartnerForm = read_form(form)?;
            let documents = read_uploads(documents)?;
            let receipt = submission_service(config)?
                .submit_partner_application(form, documents)
                .await?;
            print_receipt(&receipt);
            Ok(())
        }
        Command::Job { form, resume } => {
            let form: JobForm = read_form(form)?;
            let resume = resume.as_deref().map(read_upload).transpose()?;
            let receipt = submission_service(config)?
                .submit_job_application(form, resume)
                .await?;
            print_receipt(&receipt);
            Ok(())
        }
        Command::Vendor { action } => run_vendor(cli, config, action).await,
    }
}

fn draft_store(cli: &CliConfig, config: &SiteConfig) -> FileDraftStore {
    let dir = cli.drafts_dir.as_deref().unwrap_or(config.drafts_dir());
    FileDraftStore::new(dir)
}

fn submission_service(config: &SiteConfig) -> Result<SubmissionService<SupabaseClient>> {
    let client = SupabaseClient::from_config(config)?;
    Ok(SubmissionService::new(client).with_limits(config.document_limits()))
}

async fn run_check(config: &SiteConfig) -> Result<()> {
    let mut report = DiagnosticsReport::default();
    report.push(environment_check(&config.missing_backend_fields()));

    if config.is_backend_configured() {
        let client = SupabaseClient::from_config(config)?;
        let uploader =
            FileUploader::new(client).with_bucket_size_limit(config.max_file_size_bytes());
        Diagnostics::new(uploader).run(&mut report).await;
    }

    for check in &report.checks {
        let marker = if check.passed { "✅" } else { "❌" };
        println!("{} {:<32} {}", marker, check.name, check.detail);
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(SiteError::ConfigError {
            message: format!("{} setup check(s) failed", failed),
        });
    }
    Ok(())
}

async fn run_contact(
    config: &SiteConfig,
    store: FileDraftStore,
    overrides: ContactForm,
) -> Result<()> {
    let cache = FormProgressCache::new(store);
    let mut form = cache.load(CONTACT_FORM_ID, ContactForm::default()).await;

    if !overrides.name.is_empty() {
        form.name = overrides.name;
    }
    if !overrides.email.is_empty() {
        form.email = overrides.email;
    }
    if overrides.phone.is_some() {
        form.phone = overrides.phone;
    }
    if !overrides.subject.is_empty() {
        form.subject = overrides.subject;
    }
    if !overrides.message.is_empty() {
        form.message = overrides.message;
    }
    cache.save(CONTACT_FORM_ID, &form).await;

    let service = submission_service(config)?;
    match service.submit_contact(form).await {
        Ok(receipt) => {
            cache.clear(CONTACT_FORM_ID).await;
            print_receipt(&receipt);
            println!("✅ Thanks! We'll get back to you soon.");
            Ok(())
        }
        Err(e) => {
            if matches!(e, SiteError::ValidationError { .. }) {
                println!("💾 Your answers were saved; re-run with the missing field.");
            }
            Err(e)
        }
    }
}

async fn run_vendor(cli: &CliConfig, config: &SiteConfig, action: &VendorAction) -> Result<()> {
    let store = draft_store(cli, config);
    let mut wizard = Wizard::resume(VENDOR_FORM_ID, vendor_application_steps(), store).await?;

    match action {
        VendorAction::Status => {}
        VendorAction::Set { fields } => {
            for (field, raw) in fields {
                wizard.update_raw(field, raw).await;
            }
        }
        VendorAction::Next => {
            wizard.next().await?;
        }
        VendorAction::Back => {
            wizard.back().await;
        }
        VendorAction::Submit { license, menus } => {
            let form: VendorForm = wizard.submit_as()?;
            let license = license.as_deref().map(read_upload).transpose()?;
            let menus = read_uploads(menus)?;

            let receipt = submission_service(config)?
                .submit_vendor_application(form, license, menus)
                .await?;
            wizard.complete().await;
            print_receipt(&receipt);
            println!("✅ Vendor application submitted");
            return Ok(());
        }
        VendorAction::Discard => {
            wizard.discard().await;
            println!("🗑️ Vendor draft discarded");
            return Ok(());
        }
    }

    print_wizard(&wizard);
    Ok(())
}

fn print_wizard<S: crate::domain::ports::DraftStore>(wizard: &Wizard<S>) {
    println!(
        "📋 Vendor application: step {}/{} ({:.0}%)",
        wizard.current_index() + 1,
        wizard.total_steps(),
        wizard.progress_percent()
    );

    for (index, step) in wizard.steps().iter().enumerate() {
        let marker = if index == wizard.current_index() { "👉" } else { "  " };
        println!("{} {}. {}", marker, index + 1, step.title);
        for field in &step.required_fields {
            let value = wizard
                .step_data(&step.id)
                .and_then(|d| d.get(field))
                .map(|v| v.to_string())
                .unwrap_or_else(|| "(required)".to_string());
            println!("       {} = {}", field, value);
        }
        if let Some(data) = wizard.step_data(&step.id) {
            for (field, value) in data {
                if !step.required_fields.contains(field) {
                    println!("       {} = {}", field, value);
                }
            }
        }
    }
}

fn print_receipt(receipt: &SubmissionReceipt) {
    tracing::debug!("Stored row in {}: {}", receipt.table, receipt.row);
    for object in &receipt.uploaded {
        println!("📎 {}", object.public_url);
    }
    for warning in &receipt.warnings {
        println!("⚠️ {}", warning);
    }
}

fn read_form<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SiteError::ValidationError {
        field: "form".to_string(),
        message: format!("{} is not a valid form file: {}", path.display(), e),
    })
}

fn read_uploads(paths: &[std::path::PathBuf]) -> Result<Vec<UploadFile>> {
    paths.iter().map(|p| read_upload(p)).collect()
}

pub fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(UploadFile::new(name, content_type_for(path), bytes))
}

pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
