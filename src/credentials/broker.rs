use anyhow::{Context, Result};
use tracing::{error, info, warn};

use super::messages::{CredentialRequest, CredentialResponse};
use crate::config::CredentialsConfig;
use crate::error::FetchError;
use crate::interview::InterviewType;

/// Authorization for one conversational session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Short-lived signed session URL; good for a single session
    SignedUrl(String),
    /// No credential needed, connect with the configured agent identifier
    DirectUse,
}

impl Credential {
    pub fn signed_url(&self) -> Option<&str> {
        match self {
            Credential::SignedUrl(url) => Some(url),
            Credential::DirectUse => None,
        }
    }
}

impl From<CredentialResponse> for Credential {
    fn from(response: CredentialResponse) -> Self {
        if response.direct_use {
            return Credential::DirectUse;
        }

        match response.signed_url {
            Some(url) if !url.is_empty() => Credential::SignedUrl(url),
            _ => {
                warn!("Credential response carried neither signedUrl nor directUse, using agent id");
                Credential::DirectUse
            }
        }
    }
}

/// Where session credentials come from
///
/// The orchestrator never calls this concurrently with itself.
#[async_trait::async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch_credential(&self, interview_type: InterviewType) -> Result<Credential, FetchError>;
}

/// HTTP client for the trusted credential endpoint
pub struct CredentialBroker {
    http: reqwest::Client,
    endpoint: String,
}

impl CredentialBroker {
    pub fn new(config: &CredentialsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("interview-coach/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build credential HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl CredentialSource for CredentialBroker {
    async fn fetch_credential(&self, interview_type: InterviewType) -> Result<Credential, FetchError> {
        info!("Requesting credential for {} from {}", interview_type, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&CredentialRequest { interview_type })
            .send()
            .await
            .map_err(|e| {
                error!("Error getting signed URL: {}", e);
                FetchError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Failed to get signed url: {}", status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body: CredentialResponse = response.json().await.map_err(|e| {
            error!("Unreadable credential response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        let credential = Credential::from(body);
        match &credential {
            Credential::SignedUrl(_) => info!("Received signed session URL"),
            Credential::DirectUse => info!("Endpoint requested direct agent use"),
        }

        Ok(credential)
    }
}
