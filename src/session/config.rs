use std::time::Duration;

use crate::config::{AgentsConfig, Config};
use crate::interview::InterviewType;
use crate::media::MediaConstraints;

/// Settings for one rehearsal screen
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub interview_type: InterviewType,

    /// Agent identifiers for the direct-use path
    pub agents: AgentsConfig,

    /// Camera + microphone request
    pub media_constraints: MediaConstraints,

    /// Pause after capture succeeds before requesting a credential
    /// Default: 1 second
    pub settle_delay: Duration,

    /// Speaking indicator redraw interval
    /// Default: 200 ms
    pub animation_cadence: Duration,
}

impl OrchestratorConfig {
    pub fn new(interview_type: InterviewType) -> Self {
        Self::from_config(&Config::default(), interview_type)
    }

    pub fn from_config(config: &Config, interview_type: InterviewType) -> Self {
        Self {
            interview_type,
            agents: config.agents.clone(),
            media_constraints: MediaConstraints::camera_and_microphone(&config.media),
            settle_delay: config.media.settle_delay(),
            animation_cadence: config.animation.cadence(),
        }
    }
}
