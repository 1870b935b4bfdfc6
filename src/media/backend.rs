use std::fmt;
use std::sync::Arc;

use crate::config::MediaConfig;
use crate::error::DeviceError;

/// Kind of a capture track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A single live capture track (camera or microphone)
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Stop capturing; releases the device once every track on it is stopped
    fn stop(&self);

    fn is_live(&self) -> bool;
}

/// A set of capture tracks returned by one device request
#[derive(Clone, Default)]
pub struct MediaStream {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Audio)
    }

    /// Stop the video tracks and return a stream made of the remaining audio tracks
    pub fn without_video(self) -> MediaStream {
        for track in self.video_tracks() {
            track.stop();
        }
        MediaStream::new(self.audio_tracks().cloned().collect())
    }

    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tracks.iter().map(|t| (t.kind(), t.id().to_string())))
            .finish()
    }
}

/// Requested video quality; values are ideals, the device may pick others
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub ideal_frame_rate: u32,
}

/// One combined camera + microphone request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: Option<VideoConstraints>,
    pub audio: bool,
}

impl MediaConstraints {
    pub fn camera_and_microphone(config: &MediaConfig) -> Self {
        Self {
            video: Some(VideoConstraints {
                ideal_width: config.width,
                ideal_height: config.height,
                ideal_frame_rate: config.frame_rate,
            }),
            audio: true,
        }
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self::camera_and_microphone(&MediaConfig::default())
    }
}

/// Capture device access
///
/// Implementations:
/// - browser: `getUserMedia` behind a single permission prompt
/// - tests: in-memory fakes recording which tracks were stopped
#[async_trait::async_trait]
pub trait CaptureDevices: Send + Sync {
    /// Request every device named by `constraints` at once
    async fn open(&self, constraints: &MediaConstraints) -> Result<MediaStream, DeviceError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
