use clap::Parser;
use prime_scan::config::LogFormat;
use prime_scan::core::ConfigProvider;
use prime_scan::utils::{logger, validation::Validate};
use prime_scan::{CliConfig, ScanEngine, ScanError, TrialDivisionScanner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(None, config.verbose),
        LogFormat::Json => logger::init_json_logger(None, config.verbose),
    }

    tracing::info!("Starting prime-scan CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    if config.monitoring_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let scanner = TrialDivisionScanner::new();
    let engine = ScanEngine::new_with_monitoring(scanner, config.monitoring_enabled())
        .with_timeout(config.timeout());

    // Ctrl-C 會在兩個候選數之間中止掃描
    let cancel = engine.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling scan");
            cancel.cancel();
        }
    });

    let rendered = engine
        .run(config.bound())
        .await
        .and_then(|report| report.render(config.output_format()));

    match rendered {
        Ok(output) => println!("{}", output),
        Err(e) => report_failure(&e),
    }

    Ok(())
}

fn report_failure(e: &ScanError) -> ! {
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
