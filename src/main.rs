use byteseq::core::WriterSink;
use byteseq::utils::monitor::SystemMonitor;
use byteseq::utils::{logger, validation::Validate};
use byteseq::{CancelToken, CliConfig, Driver, RunConfig, RunSettings, SeqError};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    // 載入 run 檔
    let file = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading run configuration from: {}", path);
            match RunConfig::from_file(path).and_then(|file| file.validate().map(|_| file)) {
                Ok(file) => Some(file),
                Err(e) => fail(&e),
            }
        }
        None => None,
    };

    let settings = RunSettings::resolve(&config, file.as_ref());
    tracing::debug!("Effective settings: {:?}", settings);

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping");
            on_signal.cancel();
        }
    });

    let handle = tokio::task::spawn_blocking(move || {
        let sink = WriterSink::new(std::io::stdout().lock(), settings.format, settings.flush_every);
        let monitor = SystemMonitor::new(settings.monitor);
        Driver::new(sink, settings.driver_options(), cancel)
            .map(|driver| driver.with_monitor(monitor))
            .and_then(|mut driver| driver.run())
    });

    match handle.await? {
        Ok(summary) => {
            tracing::info!(
                "Generated {} sequences, stop reason: {:?}",
                summary.iterations,
                summary.stop_reason
            );
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn fail(e: &SeqError) -> ! {
    tracing::debug!("Category: {:?}, Severity: {:?}", e.category(), e.severity());
    eprintln!("❌ {} ({})", e.user_friendly_message(), e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}
