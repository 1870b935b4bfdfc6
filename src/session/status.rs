use serde::Serialize;
use std::fmt;

/// Lifecycle of the rehearsal session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SessionStatus {
    #[default]
    Idle,
    AcquiringMedia,
    FetchingCredential,
    Connecting,
    Active,
    Ended,
    CredentialFailed,
}

impl SessionStatus {
    /// Whether `self -> next` is a legal edge
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;

        matches!(
            (self, next),
            (Idle, AcquiringMedia)
                | (AcquiringMedia, FetchingCredential)
                // capture denied: stop before ever connecting
                | (AcquiringMedia, Ended)
                | (FetchingCredential, Connecting)
                | (FetchingCredential, CredentialFailed)
                | (Connecting, Active)
                | (Connecting, CredentialFailed)
                | (Active, Ended)
                // manual retry: reuse a known credential or fetch again
                | (CredentialFailed, Connecting)
                | (CredentialFailed, FetchingCredential)
                // manual start after a finished session or a capture failure
                | (Ended, Connecting)
                | (Ended, FetchingCredential)
        )
    }

    /// A start request in one of these states is ignored
    pub fn is_start_in_flight(self) -> bool {
        matches!(
            self,
            SessionStatus::AcquiringMedia
                | SessionStatus::FetchingCredential
                | SessionStatus::Connecting
                | SessionStatus::Active
        )
    }

    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Active)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "Idle"),
            SessionStatus::AcquiringMedia => write!(f, "AcquiringMedia"),
            SessionStatus::FetchingCredential => write!(f, "FetchingCredential"),
            SessionStatus::Connecting => write!(f, "Connecting"),
            SessionStatus::Active => write!(f, "Active"),
            SessionStatus::Ended => write!(f, "Ended"),
            SessionStatus::CredentialFailed => write!(f, "CredentialFailed"),
        }
    }
}
