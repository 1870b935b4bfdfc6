use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::interview::InterviewType;

/// Agent identifier used when nothing else is configured
pub const FALLBACK_AGENT_ID: &str = "default_agent_id";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// URL the broker POSTs `{interviewType}` to
    pub endpoint: String,
    pub request_timeout_secs: u64,
}

/// Statically configured agent identifiers for the direct-use path
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub default: Option<String>,
    pub corporate: Option<String>,
    pub market: Option<String>,
}

/// Upstream conversational-AI API, only read by the credential endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// When absent the endpoint answers `{directUse: true}`
    pub api_key: Option<String>,
    pub signed_url_endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    /// Pause between capture success and the credential request
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub cadence_ms: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "interview-coach".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/get-signed-url".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            signed_url_endpoint:
                "https://api.elevenlabs.io/v1/convai/conversation/get_signed_url".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frame_rate: 30,
            settle_delay_ms: 1000,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { cadence_ms: 200 }
    }
}

impl Config {
    /// Load from `path` (any extension `config` understands), then apply
    /// `INTERVIEW_COACH__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("INTERVIEW_COACH")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl CredentialsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AgentsConfig {
    /// Per-type identifier, then the configured default, then the fallback
    pub fn resolve(&self, interview_type: InterviewType) -> String {
        let specific = match interview_type {
            InterviewType::Corporate => self.corporate.as_deref(),
            InterviewType::Market => self.market.as_deref(),
        };

        specific
            .filter(|id| !id.is_empty())
            .or(self.default.as_deref().filter(|id| !id.is_empty()))
            .unwrap_or(FALLBACK_AGENT_ID)
            .to_string()
    }
}

impl MediaConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl AnimationConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}
