use chrono::{DateTime, Utc};
use serde::Serialize;

use super::status::SessionStatus;
use crate::interview::InterviewType;

/// What the rehearsal screen renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationState {
    pub interview_type: InterviewType,
    /// Header, e.g. "Entretien Sales & Trading"
    pub interview_label: String,
    pub status: SessionStatus,
    /// "Connecté" / "Initialisation..." / "Déconnecté"
    pub status_label: String,
    /// Shown only while connected
    pub activity_label: Option<String>,
    /// Caption inside the speaking indicator
    pub speaking_caption: String,
    pub speaking: bool,
    pub camera_enabled: bool,
    pub initializing: bool,
    /// Sticky until a session reaches Active again
    pub credential_failed: bool,
    pub last_error: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub controls: Controls,
}

/// Which of the four user actions are currently available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub start_enabled: bool,
    /// Spinner on the start button
    pub start_busy: bool,
    pub stop_enabled: bool,
    pub back_enabled: bool,
    pub camera_toggle_enabled: bool,
}

/// Orchestrator fields the presentation is derived from
#[derive(Debug, Clone)]
pub(crate) struct ViewModel {
    pub interview_type: InterviewType,
    pub status: SessionStatus,
    pub speaking: bool,
    pub camera_enabled: bool,
    pub initializing: bool,
    pub credential_failed: bool,
    pub last_error: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
}

impl ViewModel {
    pub fn back_enabled(&self) -> bool {
        !(self.status.is_active() && !self.credential_failed)
    }

    pub fn render(&self) -> PresentationState {
        let active = self.status.is_active();

        let status_label = if active {
            "Connecté"
        } else if self.initializing {
            "Initialisation..."
        } else {
            "Déconnecté"
        };

        let activity_label = active.then(|| {
            format!(
                "L'IA est en train de {}",
                if self.speaking { "parler" } else { "écouter" }
            )
        });

        let fetching = self.status == SessionStatus::FetchingCredential;

        PresentationState {
            interview_type: self.interview_type,
            interview_label: self.interview_type.label().to_string(),
            status: self.status,
            status_label: status_label.to_string(),
            activity_label,
            speaking_caption: if self.speaking { "Parlant" } else { "En attente" }.to_string(),
            speaking: self.speaking,
            camera_enabled: self.camera_enabled,
            initializing: self.initializing,
            credential_failed: self.credential_failed,
            last_error: self.last_error.clone(),
            connected_at: self.connected_at,
            controls: Controls {
                start_enabled: self.credential_failed || !self.status.is_start_in_flight(),
                start_busy: !self.credential_failed && (self.initializing || fetching),
                stop_enabled: active,
                back_enabled: self.back_enabled(),
                camera_toggle_enabled: true,
            },
        }
    }
}
