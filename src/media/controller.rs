use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::backend::{CaptureDevices, MediaConstraints, MediaStream, MediaTrack};
use crate::error::DeviceError;

/// Outcome of a successful capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granted {
    pub video_tracks: usize,
    pub audio_tracks: usize,
}

/// Point-in-time view of the attached capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaSnapshot {
    pub video_enabled: bool,
    pub live_video_tracks: usize,
    pub live_audio_tracks: usize,
}

struct MediaState {
    /// Stream exposed to the preview surface
    stream: Option<MediaStream>,
    /// Audio tracks from streams replaced by a later acquisition; kept live
    /// until release so video toggles never interrupt the microphone
    superseded_audio: Vec<Arc<dyn MediaTrack>>,
    video_enabled: bool,
    /// Bumped on every enable/disable request; an acquisition finishing
    /// under an older generation never replaces the current stream
    generation: u64,
    released: bool,
}

/// Owns the camera/microphone stream
///
/// Cloning shares the same stream; the orchestrator hands clones to its
/// spawned acquisition tasks.
#[derive(Clone)]
pub struct MediaController {
    devices: Arc<dyn CaptureDevices>,
    constraints: MediaConstraints,
    state: Arc<Mutex<MediaState>>,
}

impl MediaController {
    pub fn new(devices: Arc<dyn CaptureDevices>, constraints: MediaConstraints) -> Self {
        Self {
            devices,
            constraints,
            state: Arc::new(Mutex::new(MediaState {
                stream: None,
                superseded_audio: Vec::new(),
                video_enabled: false,
                generation: 0,
                released: false,
            })),
        }
    }

    /// Request camera + microphone in one prompt and attach the result
    ///
    /// No automatic retry on failure.
    pub async fn acquire(&self) -> Result<Granted, DeviceError> {
        let generation = {
            let mut state = self.state.lock().await;
            if state.released {
                warn!("Capture requested after release, ignoring");
                return Err(DeviceError::Other("media already released".to_string()));
            }
            state.generation += 1;
            state.video_enabled = true;
            state.generation
        };

        info!("Requesting camera and microphone from {}", self.devices.name());

        let result = self.devices.open(&self.constraints).await;
        let mut state = self.state.lock().await;

        let stream = match result {
            Ok(stream) => stream,
            Err(e) => {
                error!("Error accessing media devices: {}", e);
                if state.generation == generation {
                    state.video_enabled = false;
                }
                return Err(e);
            }
        };

        if state.released {
            warn!("Capture completed after release, stopping {:?}", stream);
            stream.stop_all();
            return Err(DeviceError::Other("media released during acquisition".to_string()));
        }

        if state.generation != generation {
            // A newer request owns the preview; keep only this stream's microphone
            info!("Camera request superseded while acquiring, keeping audio only");
            let audio_only = stream.without_video();
            let granted = Granted {
                video_tracks: 0,
                audio_tracks: audio_only.tracks().len(),
            };
            state.superseded_audio.extend(audio_only.tracks().iter().cloned());
            return Ok(granted);
        }

        let granted = Granted {
            video_tracks: stream.video_tracks().count(),
            audio_tracks: stream.audio_tracks().count(),
        };

        state.attach(stream);

        info!(
            "Capture attached ({} video, {} audio tracks)",
            granted.video_tracks, granted.audio_tracks
        );

        Ok(granted)
    }

    /// Turn the camera preview on or off
    ///
    /// Disabling stops only the video tracks. Enabling re-runs the full
    /// camera + microphone request.
    pub async fn set_video_enabled(&self, enabled: bool) -> Result<(), DeviceError> {
        if enabled {
            return self.acquire().await.map(|_| ());
        }

        let mut state = self.state.lock().await;
        state.generation += 1;
        state.video_enabled = false;

        if let Some(stream) = state.stream.take() {
            info!("Stopping camera, keeping microphone");
            state.stream = Some(stream.without_video());
        }

        Ok(())
    }

    /// Stop every track; safe to call more than once
    pub async fn release(&self) {
        let mut state = self.state.lock().await;
        if state.released {
            return;
        }
        state.released = true;
        state.video_enabled = false;

        if let Some(stream) = state.stream.take() {
            stream.stop_all();
        }
        for track in state.superseded_audio.drain(..) {
            track.stop();
        }

        info!("Released all capture tracks");
    }

    pub async fn snapshot(&self) -> MediaSnapshot {
        let state = self.state.lock().await;

        let (live_video_tracks, live_audio_tracks) = match &state.stream {
            Some(stream) => (
                count_live(stream.video_tracks()),
                count_live(stream.audio_tracks()),
            ),
            None => (0, 0),
        };

        MediaSnapshot {
            video_enabled: state.video_enabled,
            live_video_tracks,
            live_audio_tracks: live_audio_tracks + count_live(state.superseded_audio.iter()),
        }
    }
}

impl MediaState {
    fn attach(&mut self, stream: MediaStream) {
        if let Some(previous) = self.stream.take() {
            let audio_only = previous.without_video();
            self.superseded_audio.extend(audio_only.tracks().iter().cloned());
        }
        self.stream = Some(stream);
    }
}

fn count_live<'a>(tracks: impl Iterator<Item = &'a Arc<dyn MediaTrack>>) -> usize {
    tracks.filter(|t| t.is_live()).count()
}
