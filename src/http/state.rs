use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::Config;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Client for the upstream conversational-AI API
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.credentials.request_timeout())
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}
