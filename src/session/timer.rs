use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

const TICK: Duration = Duration::from_secs(1);

/// Elapsed-seconds counter for the active session
///
/// Owns the only ticking task; `start` replaces any previous one.
pub struct TimerService {
    elapsed: Arc<watch::Sender<u64>>,
    handle: Option<JoinHandle<()>>,
}

impl TimerService {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            elapsed: Arc::new(tx),
            handle: None,
        }
    }

    /// Reset to zero and tick once per second
    pub fn start(&mut self) {
        self.cancel_tick();
        self.elapsed.send_replace(0);

        let elapsed = Arc::clone(&self.elapsed);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticker.tick().await;
                elapsed.send_modify(|secs| *secs += 1);
                debug!("Session timer at {}s", *elapsed.borrow());
            }
        }));

        info!("Session timer started");
    }

    /// Stop ticking; the last value stays visible
    pub fn stop(&mut self) {
        if self.cancel_tick() {
            info!("Session timer stopped at {}", format_elapsed(self.elapsed()));
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn elapsed(&self) -> u64 {
        *self.elapsed.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    fn cancel_tick(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.cancel_tick();
    }
}

/// `HH:MM:SS`, zero padded; hours keep growing past 24
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
