pub mod config;
pub mod conversation;
pub mod credentials;
pub mod error;
pub mod http;
pub mod interview;
pub mod media;
pub mod session;

pub use config::Config;
pub use conversation::{
    ClientTools, ConversationClient, ConversationHandle, QuestionBank, SessionEvent, SessionEvents,
    SessionParams,
};
pub use credentials::{Credential, CredentialBroker, CredentialSource};
pub use error::{DeviceError, FetchError, SessionError};
pub use http::{create_router, AppState};
pub use interview::InterviewType;
pub use media::{CaptureDevices, MediaController, MediaStream, MediaTrack, TrackKind};
pub use session::{
    format_elapsed, OrchestratorConfig, OrchestratorDeps, OrchestratorHandle, PresentationState,
    SessionOrchestrator, SessionStatus, SpeakingAnimator, SpeakingTarget, TimerService,
};
