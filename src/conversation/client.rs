use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::tools::ClientTools;
use crate::error::SessionError;

/// Variables interpolated into the agent's prompt at connect time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicVariables {
    pub interview_type: String,
}

/// Everything the remote service needs to open a session
///
/// Exactly one of `signed_url` / `agent_id` is set.
#[derive(Clone)]
pub struct SessionParams {
    pub signed_url: Option<String>,
    pub agent_id: Option<String>,
    pub dynamic_variables: DynamicVariables,
    pub client_tools: ClientTools,
}

/// Callback surface of a remote session, delivered as messages
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    Message(serde_json::Value),
    Error(String),
    /// The agent started or stopped vocalizing
    Speaking(bool),
}

/// Event sink handed to the client for one session attempt
///
/// Events are tagged with the attempt they belong to, so callbacks from an
/// abandoned session can never drive the current one.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    attempt: Uuid,
    tx: mpsc::UnboundedSender<(Uuid, SessionEvent)>,
}

impl SessionEvents {
    pub fn new(attempt: Uuid, tx: mpsc::UnboundedSender<(Uuid, SessionEvent)>) -> Self {
        Self { attempt, tx }
    }

    /// Returns false once the orchestrator has gone away
    pub fn emit(&self, event: SessionEvent) -> bool {
        self.tx.send((self.attempt, event)).is_ok()
    }
}

/// Remote conversational-AI service
#[async_trait::async_trait]
pub trait ConversationClient: Send + Sync {
    /// Open a session; connection progress arrives later through `events`
    async fn start_session(
        &self,
        params: SessionParams,
        events: SessionEvents,
    ) -> Result<Box<dyn ConversationHandle>, SessionError>;
}

/// An open remote session
#[async_trait::async_trait]
pub trait ConversationHandle: Send + Sync {
    async fn end_session(&self) -> Result<(), SessionError>;
}
