use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::api::traits::AlertSource;
use crate::models::alert::Alert;

/// Shortest interval the poller accepts; smaller values are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

enum PollerCommand {
    RefreshNow,
    Shutdown,
}

/// Periodically fetches triggered alerts and publishes the latest snapshot.
///
/// The first poll happens immediately. A failed poll keeps the previous
/// snapshot. Dropping the poller stops the task.
pub struct AlertPoller {
    commands: mpsc::Sender<PollerCommand>,
    alerts: watch::Receiver<Vec<Alert>>,
    handle: Option<JoinHandle<()>>,
}

impl AlertPoller {
    /// Start polling on the current tokio runtime.
    pub fn spawn(source: Arc<dyn AlertSource>, every: Duration) -> Self {
        let every = if every < MIN_POLL_INTERVAL {
            tracing::warn!("Alert poll interval {every:?} too short, using {MIN_POLL_INTERVAL:?}");
            MIN_POLL_INTERVAL
        } else {
            every
        };
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (alert_tx, alert_rx) = watch::channel(Vec::new());
        let handle = tokio::spawn(run(source, every, cmd_rx, alert_tx));

        Self {
            commands: cmd_tx,
            alerts: alert_rx,
            handle: Some(handle),
        }
    }

    /// A receiver that sees every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Alert>> {
        self.alerts.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn current(&self) -> Vec<Alert> {
        self.alerts.borrow().clone()
    }

    /// Poll now instead of waiting for the next tick.
    pub fn refresh(&self) {
        if self.commands.try_send(PollerCommand::RefreshNow).is_err() {
            tracing::debug!("alert poller busy or stopped, refresh skipped");
        }
    }

    /// Stop the task and wait for it to finish.
    pub async fn stop(mut self) {
        let _ = self.commands.send(PollerCommand::Shutdown).await;
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "alert poller task ended abnormally");
            }
        }
    }
}

impl Drop for AlertPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(
    source: Arc<dyn AlertSource>,
    every: Duration,
    mut commands: mpsc::Receiver<PollerCommand>,
    alerts: watch::Sender<Vec<Alert>>,
) {
    tracing::info!("Starting alert poller with interval {:?}", every);

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => poll_once(source.as_ref(), &alerts).await,
            cmd = commands.recv() => match cmd {
                Some(PollerCommand::RefreshNow) => poll_once(source.as_ref(), &alerts).await,
                Some(PollerCommand::Shutdown) | None => {
                    tracing::info!("Alert poller shutting down");
                    break;
                }
            },
        }
    }
}

async fn poll_once(source: &dyn AlertSource, alerts: &watch::Sender<Vec<Alert>>) {
    match source.triggered_alerts().await {
        Ok(latest) => {
            tracing::debug!(count = latest.len(), "triggered alerts refreshed");
            alerts.send_replace(latest);
        }
        Err(e) => tracing::warn!(error = %e, "failed to fetch triggered alerts"),
    }
}
