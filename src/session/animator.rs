use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// Transition curves the indicator picks from while speaking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    EaseIn,
    EaseOut,
    CircIn,
    CircOut,
}

impl Easing {
    pub const ALL: [Easing; 4] = [Easing::EaseIn, Easing::EaseOut, Easing::CircIn, Easing::CircOut];
}

/// Where the "AI is talking" indicator should move next
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeakingTarget {
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
    pub duration_seconds: f64,
    /// `None` leaves the surface's default curve
    pub easing: Option<Easing>,
}

impl SpeakingTarget {
    pub const SCALE_RANGE: (f64, f64) = (0.7, 1.5);
    pub const OFFSET_RANGE: (f64, f64) = (-4.0, 4.0);
    pub const DURATION_RANGE: (f64, f64) = (0.2, 0.5);

    /// Resting position shown while the agent is silent
    pub const NEUTRAL: SpeakingTarget = SpeakingTarget {
        scale: 1.0,
        dx: 0.0,
        dy: 0.0,
        duration_seconds: 0.2,
        easing: None,
    };

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (scale_lo, scale_hi) = Self::SCALE_RANGE;
        let (offset_lo, offset_hi) = Self::OFFSET_RANGE;
        let (dur_lo, dur_hi) = Self::DURATION_RANGE;

        Self {
            scale: rng.random_range(scale_lo..scale_hi),
            dx: rng.random_range(offset_lo..offset_hi),
            dy: rng.random_range(offset_lo..offset_hi),
            duration_seconds: rng.random_range(dur_lo..dur_hi),
            easing: Some(Easing::ALL[rng.random_range(0..Easing::ALL.len())]),
        }
    }

    pub fn is_within_bounds(&self) -> bool {
        let within = |v: f64, (lo, hi): (f64, f64)| v >= lo && v <= hi;

        within(self.scale, Self::SCALE_RANGE)
            && within(self.dx, Self::OFFSET_RANGE)
            && within(self.dy, Self::OFFSET_RANGE)
            && within(self.duration_seconds, Self::DURATION_RANGE)
    }
}

impl Default for SpeakingTarget {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Receives animation targets; best effort, never reports failure
pub trait AnimationSurface: Send + Sync {
    fn animate(&self, target: SpeakingTarget);
}

/// Surface that publishes the latest target on a watch channel
pub struct WatchSurface {
    tx: watch::Sender<SpeakingTarget>,
}

impl WatchSurface {
    pub fn new() -> (Self, watch::Receiver<SpeakingTarget>) {
        let (tx, rx) = watch::channel(SpeakingTarget::NEUTRAL);
        (Self { tx }, rx)
    }
}

impl AnimationSurface for WatchSurface {
    fn animate(&self, target: SpeakingTarget) {
        self.tx.send_replace(target);
    }
}

/// Drives the speaking indicator from the agent's vocalization signal
pub struct SpeakingAnimator {
    surface: Arc<dyn AnimationSurface>,
    cadence: Duration,
    /// `None` until the first signal arrives
    speaking: Option<bool>,
    handle: Option<JoinHandle<()>>,
}

impl SpeakingAnimator {
    pub fn new(surface: Arc<dyn AnimationSurface>, cadence: Duration) -> Self {
        Self {
            surface,
            cadence,
            speaking: None,
            handle: None,
        }
    }

    /// Push the latest vocalization state; repeats of the same value are ignored
    pub fn set_speaking(&mut self, speaking: bool) {
        if self.speaking == Some(speaking) {
            return;
        }
        self.speaking = Some(speaking);

        if speaking {
            self.start_draws();
        } else {
            self.stop();
            self.surface.animate(SpeakingTarget::NEUTRAL);
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.unwrap_or(false)
    }

    /// Cancel the draw loop without moving the indicator
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Speaking animation loop stopped");
        }
    }

    fn start_draws(&mut self) {
        self.stop();

        let surface = Arc::clone(&self.surface);
        let cadence = self.cadence;
        self.handle = Some(tokio::spawn(async move {
            let mut rng = StdRng::from_os_rng();
            let mut ticker = interval_at(Instant::now() + cadence, cadence);
            loop {
                ticker.tick().await;
                let target = SpeakingTarget::random(&mut rng);
                debug!(?target, "Speaking draw");
                surface.animate(target);
            }
        }));
    }
}

impl Drop for SpeakingAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}
