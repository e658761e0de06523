use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "meal-leads")]
#[command(about = "Lead capture forms, drafts and uploads for the meal delivery site")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to site.toml")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for saved form drafts")]
    pub drafts_dir: Option<String>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check configuration, connectivity and storage buckets
    Check,

    /// Send the contact form. Missing fields are kept as a draft.
    Contact {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long, help = "Forget the saved contact draft and exit")]
        discard: bool,
    },

    /// Subscribe an email address to the newsletter
    Subscribe {
        #[arg(long)]
        email: String,
        #[arg(long)]
        source: Option<String>,
    },

    /// Submit a partner application from a JSON form file
    Partner {
        #[arg(long)]
        form: PathBuf,
        #[arg(long = "document")]
        documents: Vec<PathBuf>,
    },

    /// Submit a job application from a JSON form file
    Job {
        #[arg(long)]
        form: PathBuf,
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Multi-step vendor application
    Vendor {
        #[command(subcommand)]
        action: VendorAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum VendorAction {
    /// Show the current step and saved values
    Status,

    /// Set fields on the current step (field=value; lists take a,b or a JSON array)
    Set {
        #[arg(value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },

    /// Validate the current step and move forward
    Next,

    /// Move one step back
    Back,

    /// Submit the application from the final step
    Submit {
        #[arg(long)]
        license: Option<PathBuf>,
        #[arg(long = "menu")]
        menus: Vec<PathBuf>,
    },

    /// Delete the saved draft
    Discard,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got `{}`", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{}`", raw));
    }
    Ok((field.to_string(), value.to_string()))
}
