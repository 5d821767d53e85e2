//! uptimerobot-exporter - UptimeRobot metrics for Prometheus
//!
//! Polls the UptimeRobot read-only API on a fixed interval and serves the
//! results as Prometheus gauges.

mod api;
mod collector;
mod config;
mod metrics;
mod scheduler;
mod web;

use api::ReadApi;
use collector::Collector;
use config::Settings;
use metrics::Metrics;
use scheduler::Scheduler;
use web::Server;

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BANNER: &str = r#"
 _   _       _   _               ____       _           _
| | | |_ __ | |_(_)_ __ ___   __|  _ \ ___ | |__   ___ | |_
| | | | '_ \| __| | '_ ` _ \ / _ \ |_) / _ \| '_ \ / _ \| __|
| |_| | |_) | |_| | | | | | |  __/  _ < (_) | |_) | (_) | |_
 \___/| .__/ \__|_|_| |_| |_|\___|_| \_\___/|_.__/ \___/ \__|
      |_|                                         exporter
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("{}", BANNER);

    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("uptimerobot_exporter={}", settings.log_level.as_directive()).parse()?,
            ),
        )
        .init();

    for warning in &settings.warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("uptimerobot_exporter version {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Initialized uptimerobot_exporter with:");
    tracing::info!("UPTIMEROBOT_READ_API_KEY=<redacted>");
    tracing::info!("LOG_LEVEL={}", settings.log_level);
    tracing::info!("PORT={}", settings.port);
    tracing::info!("INTERVAL_SECONDS={}", settings.interval_seconds);

    let metrics = Arc::new(Metrics::new()?);
    let collector = Arc::new(Collector::new(
        ReadApi::new(settings.api_key.clone()),
        metrics.clone(),
    ));

    // Start collecting
    let scheduler = Scheduler::new(collector, Duration::from_secs(settings.interval_seconds));
    let mut collection = scheduler.start().await;

    // Serve metrics until Ctrl-C
    let server = Server::new(settings.port, metrics.clone());
    let served = server.start(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down");
    });
    tokio::pin!(served);

    let collection_ended = tokio::select! {
        result = &mut served => {
            result?;
            false
        }
        joined = &mut collection => {
            match joined {
                Ok(()) => tracing::error!("Collection task stopped unexpectedly"),
                Err(e) => tracing::error!("Collection task ended abnormally: {}", e),
            }
            true
        }
    };

    if collection_ended {
        // Keep serving so the failure stays visible as uptimerobot_up 0.
        metrics.up.set(0.0);
        served.await?;
    } else {
        scheduler.stop().await;
        if let Err(e) = collection.await {
            tracing::error!("Collection task ended abnormally: {}", e);
        }
    }

    Ok(())
}
