use serde::{Deserialize, Serialize};

use crate::interview::InterviewType;

/// Body POSTed to the credential endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    pub interview_type: InterviewType,
}

/// Credential endpoint answer: either `{signedUrl}` or `{directUse: true}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_url: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub direct_use: bool,
}

/// Error body returned by the endpoint on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialErrorResponse {
    pub error: String,
}

impl CredentialResponse {
    pub fn signed(url: impl Into<String>) -> Self {
        Self {
            signed_url: Some(url.into()),
            direct_use: false,
        }
    }

    pub fn direct_use() -> Self {
        Self {
            signed_url: None,
            direct_use: true,
        }
    }
}
