// Stream driver - Start/stop the periodic simulation tick
use crate::application::fleet_engine::FleetEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Owns the timer task. The handle never leaves this type.
#[derive(Clone)]
pub struct StreamDriver {
    engine: FleetEngine,
    period: Duration,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl StreamDriver {
    pub fn new(engine: FleetEngine, period: Duration) -> Self {
        Self {
            engine,
            period,
            handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Begin ticking. Returns false when already running.
    pub async fn start(&self) -> bool {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            return false;
        }

        self.engine.mark_stream_started().await;

        let engine = self.engine.clone();
        let period = self.period;
        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // Each tick runs to completion before the next wait.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                engine.tick().await;
            }
        }));

        tracing::info!("Telemetry stream started ({} ms period)", period.as_millis());
        true
    }

    /// Stop ticking. The stream flag is cleared even when nothing was running.
    pub async fn stop(&self) -> bool {
        let was_running = match self.handle.lock().await.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        };

        self.engine.set_stream(false).await;
        if was_running {
            tracing::info!("Telemetry stream stopped");
        }
        was_running
    }

    pub async fn is_running(&self) -> bool {
        self.handle.lock().await.is_some()
    }
}
