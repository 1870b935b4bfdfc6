//! Camera and microphone ownership
//!
//! `MediaController` is the only component that touches capture devices.
//! Everything else sees the `cameraEnabled` flag it publishes.

pub mod backend;
pub mod controller;

pub use backend::{
    CaptureDevices, MediaConstraints, MediaStream, MediaTrack, TrackKind, VideoConstraints,
};
pub use controller::{Granted, MediaController, MediaSnapshot};
