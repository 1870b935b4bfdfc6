//! Error taxonomy for the rehearsal session
//!
//! Every variant resolves into a stable, re-triggerable state in the
//! orchestrator. None of them is retried automatically.

use thiserror::Error;

/// Camera/microphone acquisition failure
///
/// Terminal for the automatic flow; the user re-attempts capture by
/// toggling the camera.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("permission to use camera/microphone was denied")]
    PermissionDenied,

    #[error("no capture device available: {0}")]
    NotFound(String),

    #[error("capture device error: {0}")]
    Other(String),
}

/// Credential endpoint failure (network or non-2xx status)
///
/// Recoverable through the manual start control; sets the sticky failure flag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("credential request failed: {0}")]
    Network(String),

    #[error("credential endpoint returned {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("credential endpoint returned an unusable body: {0}")]
    InvalidResponse(String),
}

/// Remote conversational session failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session could not be opened
    #[error("failed to start conversation: {0}")]
    Connect(String),

    /// The remote side reported an error while connecting or connected
    #[error("conversation error: {0}")]
    Runtime(String),

    /// The handle was used after the session closed
    #[error("conversation already closed")]
    Closed,
}

impl DeviceError {
    /// Short user-facing explanation
    pub fn user_message(&self) -> &'static str {
        match self {
            DeviceError::PermissionDenied => {
                "Accès à la caméra et au micro refusé. Réactivez la caméra pour réessayer."
            }
            DeviceError::NotFound(_) => "Aucune caméra ou micro détecté.",
            DeviceError::Other(_) => "Erreur d'accès aux périphériques.",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::InvalidResponse(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
