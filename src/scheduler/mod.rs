//! Scheduler module for running collection cycles on a fixed interval.

use crate::collector::Collector;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Runs [`Collector::collect`] once per interval, one cycle at a time.
pub struct Scheduler {
    collector: Arc<Collector>,
    interval: Duration,
    stop: Arc<Mutex<Option<broadcast::Sender<()>>>>,
}

impl Scheduler {
    pub fn new(collector: Arc<Collector>, interval: Duration) -> Self {
        Self {
            collector,
            interval,
            stop: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the collection loop. The first cycle runs immediately.
    pub async fn start(&self) -> JoinHandle<()> {
        let (tx, mut rx) = broadcast::channel(1);
        {
            let mut stop_guard = self.stop.lock().await;
            *stop_guard = Some(tx);
        }

        let collector = self.collector.clone();
        let period = self.interval;

        tracing::info!("Scheduler: collecting every {:?}", period);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // A slow cycle pushes the next one back instead of bursting.
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = rx.recv() => break,
                    _ = interval.tick() => {
                        collector.collect().await;
                        tracing::debug!("Waiting {:?} before the next scrape", period);
                    }
                }
            }

            tracing::info!("Scheduler: stopped");
        })
    }

    /// Stop the collection loop after the current cycle.
    pub async fn stop(&self) {
        let stop = self.stop.lock().await;
        if let Some(tx) = stop.as_ref() {
            let _ = tx.send(());
        }
    }
}
