//! Component F — LivenessMonitor.
//!
//! A periodic tick that detects data starvation and absent configuration
//! frames and triggers recovery (spec §4.F). Runs as its own task and
//! talks to the mapper only through a command channel — this keeps
//! `bytesReceived`/`receivedConfigFrame` single-writer from the mapper's
//! point of view, per the concurrency model in spec §5.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Commands the liveness task sends back to the mapper loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessAction {
    RestartConnectCycle,
    LoadCachedConfiguration,
}

/// Shared counters the parser event pipeline updates and the liveness
/// task reads and resets. `bytes_since_tick` is the only field the
/// monitor mutates; everything else is monitor-read, mapper-write.
#[derive(Default)]
pub struct LivenessState {
    pub bytes_since_tick: AtomicU64,
    pub config_received: AtomicBool,
}

pub struct LivenessMonitor {
    handle: JoinHandle<()>,
}

impl LivenessMonitor {
    /// Starts the ticker. `allow_cached_config` and `supports_commands`
    /// are fixed for the lifetime of one connection.
    pub fn start(
        state: Arc<LivenessState>,
        interval: Duration,
        allow_cached_config: bool,
        supports_commands: bool,
        actions: mpsc::Sender<LivenessAction>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it
            let mut cached_config_tick_seen = false;
            loop {
                ticker.tick().await;
                let bytes = state.bytes_since_tick.swap(0, Ordering::AcqRel);
                if bytes == 0 && supports_commands {
                    log::warn!("no bytes received within liveness interval, restarting connect cycle");
                    if actions.send(LivenessAction::RestartConnectCycle).await.is_err() {
                        return;
                    }
                    continue;
                }
                if !state.config_received.load(Ordering::Acquire) && allow_cached_config {
                    if !cached_config_tick_seen {
                        cached_config_tick_seen = true;
                        log::info!("no configuration frame received, attempting cached configuration");
                        if actions.send(LivenessAction::LoadCachedConfiguration).await.is_err() {
                            return;
                        }
                    } else if supports_commands {
                        log::warn!("still no configuration after cached-configuration attempt, restarting connect cycle");
                        if actions.send(LivenessAction::RestartConnectCycle).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test(start_paused = true)]
    async fn fires_restart_when_no_bytes() {
        let state = Arc::new(LivenessState::default());
        let (tx, mut rx) = mpsc::channel(8);
        let monitor = LivenessMonitor::start(state.clone(), Duration::from_millis(10), true, true, tx);
        tokio::time::advance(Duration::from_millis(25)).await;
        let action = rx.recv().await.unwrap();
        assert_eq!(action, LivenessAction::RestartConnectCycle);
        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn cached_config_attempted_once_then_restarts() {
        let state = Arc::new(LivenessState::default());
        state.bytes_since_tick.store(1, Ordering::Release);
        let (tx, mut rx) = mpsc::channel(8);
        let monitor = LivenessMonitor::start(state.clone(), Duration::from_millis(10), true, true, tx);

        tokio::time::advance(Duration::from_millis(15)).await;
        state.bytes_since_tick.store(1, Ordering::Release);
        assert_eq!(rx.recv().await.unwrap(), LivenessAction::LoadCachedConfiguration);

        tokio::time::advance(Duration::from_millis(15)).await;
        state.bytes_since_tick.store(1, Ordering::Release);
        assert_eq!(rx.recv().await.unwrap(), LivenessAction::RestartConnectCycle);

        monitor.stop();
    }
}
