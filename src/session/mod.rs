//! Rehearsal session orchestration
//!
//! This module sequences one spoken interview session:
//! - Camera/microphone acquisition
//! - Credential retrieval
//! - Remote session start/stop/error/retry
//! - Elapsed-time counter while connected
//! - Speaking indicator driven by the agent's vocalization

mod animator;
mod config;
mod orchestrator;
mod presentation;
mod status;
mod timer;

pub use animator::{AnimationSurface, Easing, SpeakingAnimator, SpeakingTarget, WatchSurface};
pub use config::OrchestratorConfig;
pub use orchestrator::{
    ExitReason, OrchestratorDeps, OrchestratorHandle, SessionOrchestrator, UserAction,
};
pub use presentation::{Controls, PresentationState};
pub use status::SessionStatus;
pub use timer::{format_elapsed, TimerService};
