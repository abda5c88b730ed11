use anyhow::Context;
use clap::Parser;
use prime_scan::core::ConfigProvider;
use prime_scan::utils::{logger, validation::Validate};
use prime_scan::{ScanEngine, TomlConfig, TrialDivisionScanner};

#[derive(Parser)]
#[command(name = "toml-scan")]
#[command(about = "Prime scan driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "prime-scan.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the bound from the config
    #[arg(long, allow_negative_numbers = true)]
    bound: Option<i64>,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show the resolved settings without scanning
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    // 無效的 log_level 交給下方的驗證回報，這裡先退回預設等級
    logger::init_cli_logger(config.tracing_level().unwrap_or(None), args.verbose);

    tracing::info!("🚀 Starting TOML-based prime scan");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(bound) = args.bound {
        config.scan.bound = Some(bound);
        tracing::info!("🔧 Bound overridden to: {}", bound);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    display_config_summary(&config, monitor_enabled);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No scan will run");
        return Ok(());
    }

    let engine = ScanEngine::new_with_monitoring(TrialDivisionScanner::new(), monitor_enabled)
        .with_timeout(config.timeout());

    let cancel = engine.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling scan");
            cancel.cancel();
        }
    });

    match engine.run(config.bound()).await {
        Ok(report) => {
            println!("{}", report.render(config.output_format())?);
        }
        Err(e) => {
            tracing::error!(
                "❌ Scan failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, monitor_enabled: bool) {
    eprintln!("📋 Configuration Summary:");
    eprintln!("  Bound: {}", config.bound());
    eprintln!("  Max Bound: {}", config.max_bound());
    match config.timeout() {
        Some(timeout) => eprintln!("  Timeout: {:?}", timeout),
        None => eprintln!("  Timeout: none"),
    }
    eprintln!("  Format: {}", config.output_format().as_str());
    eprintln!("  Monitoring: {}", monitor_enabled);
    if let Some(level) = config.log_level() {
        eprintln!("  Log Level: {}", level);
    }
    eprintln!();
}
