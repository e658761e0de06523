#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, VendorAction};
pub use env::BackendEnv;
pub use toml_config::SiteConfig;
