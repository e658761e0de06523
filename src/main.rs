use clap::Parser;
use meal_leads::utils::error::ErrorSeverity;
use meal_leads::utils::{logger, validation::Validate};
use meal_leads::{CliConfig, SiteConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting meal-leads CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match SiteConfig::load(cli.config.as_deref()).and_then(|c| {
        c.validate()?;
        Ok(c)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 缺少後端設定只顯示警告
    let missing = config.missing_backend_fields();
    if !missing.is_empty() {
        tracing::warn!("⚠️ Backend not configured, missing: {}", missing.join(", "));
        eprintln!("⚠️ ────────────────────────────────────────────────");
        eprintln!("⚠️ Backend is not configured: {} not set.", missing.join(", "));
        eprintln!("⚠️ Forms cannot be submitted until these are provided.");
        eprintln!("⚠️ ────────────────────────────────────────────────");
    }

    if let Err(e) = meal_leads::app::run(&cli, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
