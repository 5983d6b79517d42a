use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use homework_core::{Monitor, ServiceType};
use tracing::{error, info};

use homework_bot::config::{self, Config, ConfigError};
use homework_bot::logging;
use homework_bot::transport::create_http_client;
use homework_bot::{PracticumClient, RecordingLogger, TelegramChannel};

/// Telegram notifications for homework review status changes
#[derive(Parser, Debug)]
#[command(name = "homework-bot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Seconds between poll cycles (overrides RETRY_TIME)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,
}

fn report_config_error(e: &ConfigError) {
    for line in e.report_lines() {
        error!(severity = "critical", "{}", line);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(config::log_file_from_env().as_deref())?;

    info!("Starting homework status bot {}", homework_core::version());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e);
            return Err(e.into());
        }
    };

    let recording_logger = if config.recording_enabled {
        match RecordingLogger::new(&config.recording_log_path) {
            Ok(logger) => {
                info!(
                    "Recording enabled, logging to: {}",
                    config.recording_log_path.display()
                );
                Some(logger)
            }
            Err(e) => {
                error!("Failed to initialize recording logger: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let api = PracticumClient::new(
        create_http_client(
            ServiceType::ReviewApi,
            config.http_timeout,
            recording_logger.clone(),
        )?,
        config.practicum_endpoint.clone(),
        config.practicum_token.clone(),
    );

    let channel = TelegramChannel::new(
        create_http_client(
            ServiceType::Telegram,
            config.http_timeout,
            recording_logger,
        )?,
        &config.telegram_api_base,
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
    );

    let poll_interval = cli
        .interval
        .map(Duration::from_secs)
        .unwrap_or(config.retry_time);

    let mut monitor = Monitor::new(api, channel, config.initial_cursor(poll_interval))
        .with_poll_interval(poll_interval);

    info!("Polling every {}s", monitor.poll_interval().as_secs());

    if cli.once {
        let outcome = monitor.run_cycle().await;
        info!("Single cycle finished: {:?}", outcome);
    } else {
        monitor.run_until(shutdown_signal()).await;
    }

    Ok(())
}
