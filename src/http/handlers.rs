use super::state::AppState;
use crate::credentials::{CredentialErrorResponse, CredentialResponse};
use crate::interview::InterviewType;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignedUrlRequest {
    /// "corporate" or "market"; validated by the handler
    #[serde(rename = "interviewType")]
    pub interview_type: String,
}

/// Upstream answer to a signed URL request
#[derive(Debug, Deserialize)]
struct UpstreamSignedUrl {
    signed_url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/get-signed-url
/// Issue a session credential, or tell the client to use the agent id directly
pub async fn get_signed_url(
    State(state): State<AppState>,
    Json(req): Json<SignedUrlRequest>,
) -> impl IntoResponse {
    let interview_type = match req.interview_type.parse::<InterviewType>() {
        Ok(t) => t,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CredentialErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let Some(api_key) = state.config.upstream.api_key.as_deref().filter(|k| !k.is_empty()) else {
        info!("No upstream API key configured, answering directUse for {}", interview_type);
        return (StatusCode::OK, Json(CredentialResponse::direct_use())).into_response();
    };

    let agent_id = state.config.agents.resolve(interview_type);
    info!("Requesting signed URL for agent {} ({})", agent_id, interview_type);

    match request_signed_url(&state, api_key, &agent_id).await {
        Ok(signed_url) => (StatusCode::OK, Json(CredentialResponse::signed(signed_url))).into_response(),
        Err(e) => {
            error!("Failed to get signed URL: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CredentialErrorResponse {
                    error: "Failed to generate signed URL".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn request_signed_url(state: &AppState, api_key: &str, agent_id: &str) -> Result<String> {
    let response = state
        .http
        .get(&state.config.upstream.signed_url_endpoint)
        .query(&[("agent_id", agent_id)])
        .header("xi-api-key", api_key)
        .send()
        .await
        .context("Upstream request failed")?
        .error_for_status()
        .context("Upstream rejected the request")?;

    let body: UpstreamSignedUrl = response
        .json()
        .await
        .context("Upstream returned an unexpected body")?;

    Ok(body.signed_url)
}
