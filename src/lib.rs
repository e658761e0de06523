pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{BackendEnv, SiteConfig};

pub use crate::adapters::{FileDraftStore, MemoryDraftStore, SupabaseClient};
pub use crate::core::forms::SubmissionService;
pub use crate::core::progress::FormProgressCache;
pub use crate::core::upload::{validate_files, FileUploader, UploadReport};
pub use crate::core::wizard::{Wizard, WizardStep};
pub use crate::utils::error::{Result, SiteError};
