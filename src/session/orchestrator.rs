use anyhow::{Context, Result};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::animator::{SpeakingAnimator, SpeakingTarget, WatchSurface};
use super::config::OrchestratorConfig;
use super::presentation::{PresentationState, ViewModel};
use super::status::SessionStatus;
use super::timer::{format_elapsed, TimerService};
use crate::conversation::{
    ClientTools, ConversationClient, ConversationHandle, DynamicVariables, QuestionBank,
    SessionEvent, SessionEvents, SessionParams,
};
use crate::credentials::{Credential, CredentialSource};
use crate::error::{DeviceError, FetchError, SessionError};
use crate::media::{CaptureDevices, Granted, MediaController};

/// The four actions the rehearsal screen offers, plus teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ToggleCamera,
    Start,
    Stop,
    Back,
    Teardown,
}

/// Why the orchestrator stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// User navigated back to the selection screen
    Back,
    /// Screen torn down (explicitly or by dropping the handle)
    Teardown,
}

/// External collaborators the orchestrator drives
#[derive(Clone)]
pub struct OrchestratorDeps {
    pub devices: Arc<dyn CaptureDevices>,
    pub credentials: Arc<dyn CredentialSource>,
    pub conversation: Arc<dyn ConversationClient>,
    pub questions: Arc<dyn QuestionBank>,
}

/// Results of suspension points, reported back to the actor loop
enum Completion {
    MediaAcquired {
        camera_generation: u64,
        result: Result<Granted, DeviceError>,
    },
    SettleElapsed,
    CameraEnabled {
        camera_generation: u64,
        result: Result<(), DeviceError>,
    },
    CredentialFetched(Result<Credential, FetchError>),
    SessionStarted {
        attempt: Uuid,
        result: Result<Box<dyn ConversationHandle>, SessionError>,
    },
}

/// Session orchestration state machine
///
/// Runs as a single task. User actions, remote session events and the
/// results of its own asynchronous steps are handled one message at a time,
/// each as one atomic transition.
pub struct SessionOrchestrator {
    config: OrchestratorConfig,

    media: MediaController,
    credentials: Arc<dyn CredentialSource>,
    conversation: Arc<dyn ConversationClient>,
    tools: ClientTools,
    timer: TimerService,
    animator: SpeakingAnimator,

    status: SessionStatus,
    camera_enabled: bool,
    /// Bumped on every camera toggle; capture results from an older
    /// generation never touch `camera_enabled`
    camera_generation: u64,
    initializing: bool,
    /// Sticky failure flag
    credential_failed: bool,
    speaking: bool,
    last_error: Option<String>,
    connected_at: Option<chrono::DateTime<Utc>>,

    /// Credential known from the last successful fetch
    credential: Option<Credential>,
    /// Open remote session, exclusively owned here
    session: Option<Box<dyn ConversationHandle>>,
    /// Session attempt whose events are currently accepted
    attempt: Option<Uuid>,

    /// Cancelled once at teardown; every continuation checks it
    cancel: CancellationToken,
    completions: mpsc::UnboundedSender<Completion>,
    completions_rx: Option<mpsc::UnboundedReceiver<Completion>>,
    events: mpsc::UnboundedSender<(Uuid, SessionEvent)>,
    events_rx: Option<mpsc::UnboundedReceiver<(Uuid, SessionEvent)>>,

    state_tx: watch::Sender<PresentationState>,
    target_rx: watch::Receiver<SpeakingTarget>,
}

impl SessionOrchestrator {
    pub fn new(config: OrchestratorConfig, deps: OrchestratorDeps) -> Self {
        let (surface, target_rx) = WatchSurface::new();
        let (completions, completions_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();

        let view = ViewModel {
            interview_type: config.interview_type,
            status: SessionStatus::Idle,
            speaking: false,
            camera_enabled: true,
            initializing: true,
            credential_failed: false,
            last_error: None,
            connected_at: None,
        };
        let (state_tx, _state_rx) = watch::channel(view.render());

        Self {
            media: MediaController::new(deps.devices, config.media_constraints),
            credentials: deps.credentials,
            conversation: deps.conversation,
            tools: ClientTools::new(config.interview_type, deps.questions),
            timer: TimerService::new(),
            animator: SpeakingAnimator::new(Arc::new(surface), config.animation_cadence),
            config,

            status: SessionStatus::Idle,
            camera_enabled: true,
            camera_generation: 0,
            initializing: true,
            credential_failed: false,
            speaking: false,
            last_error: None,
            connected_at: None,

            credential: None,
            session: None,
            attempt: None,

            cancel: CancellationToken::new(),
            completions,
            completions_rx: Some(completions_rx),
            events,
            events_rx: Some(events_rx),

            state_tx,
            target_rx,
        }
    }

    /// Shared handle to the capture state, for inspection
    pub fn media(&self) -> MediaController {
        self.media.clone()
    }

    /// Spawn the actor and return the handle the screen talks to
    pub fn spawn(self) -> OrchestratorHandle {
        let (actions_tx, actions_rx) = mpsc::channel(32);
        let state = self.state_tx.subscribe();
        let elapsed = self.timer.subscribe();
        let speaking_target = self.target_rx.clone();
        let media = self.media.clone();

        let task = tokio::spawn(self.run(actions_rx));

        OrchestratorHandle {
            actions: actions_tx,
            state,
            elapsed,
            speaking_target,
            media,
            task,
        }
    }

    /// Actor loop; activates once, then runs until back or teardown
    pub async fn run(mut self, mut actions: mpsc::Receiver<UserAction>) -> ExitReason {
        let (Some(mut completions), Some(mut events)) =
            (self.completions_rx.take(), self.events_rx.take())
        else {
            error!("Orchestrator already ran");
            return ExitReason::Teardown;
        };

        info!("Rehearsal screen mounted ({})", self.config.interview_type);
        self.animator.set_speaking(false);
        self.activate();
        self.publish();

        let reason = loop {
            tokio::select! {
                action = actions.recv() => match action {
                    Some(UserAction::Back) => {
                        if self.view().back_enabled() {
                            info!("Navigating back");
                            break ExitReason::Back;
                        }
                        warn!("Back is disabled while a session is running");
                    }
                    Some(UserAction::Teardown) | None => break ExitReason::Teardown,
                    Some(action) => self.handle_action(action).await,
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
                Some((attempt, event)) = events.recv() => self.handle_event(attempt, event),
            }
            self.publish();
        };

        self.teardown().await;
        reason
    }

    // ------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------

    async fn handle_action(&mut self, action: UserAction) {
        debug!(?action, status = %self.status, "User action");

        match action {
            UserAction::ToggleCamera => self.toggle_camera().await,
            UserAction::Start => self.start(),
            UserAction::Stop => self.stop(),
            UserAction::Back | UserAction::Teardown => {}
        }
    }

    async fn toggle_camera(&mut self) {
        self.camera_generation += 1;
        let camera_generation = self.camera_generation;

        if self.camera_enabled {
            self.camera_enabled = false;
            if let Err(e) = self.media.set_video_enabled(false).await {
                warn!("Failed to stop camera: {}", e);
            }
        } else {
            self.camera_enabled = true;
            let media = self.media.clone();
            self.spawn_step(async move {
                Completion::CameraEnabled {
                    camera_generation,
                    result: media.set_video_enabled(true).await,
                }
            });
        }
    }

    fn start(&mut self) {
        if self.status.is_start_in_flight() {
            warn!("Start ignored, session already {}", self.status);
            return;
        }
        self.begin_session();
    }

    fn stop(&mut self) {
        if !self.status.is_active() {
            warn!("Stop ignored, session is {}", self.status);
            return;
        }

        info!("Stopping conversation");
        self.attempt = None;
        self.leave_active();
        self.close_session();
    }

    // ------------------------------------------------------------------
    // Start sequence
    // ------------------------------------------------------------------

    fn activate(&mut self) {
        if !self.transition(SessionStatus::AcquiringMedia) {
            return;
        }

        let media = self.media.clone();
        let camera_generation = self.camera_generation;
        self.spawn_step(async move {
            Completion::MediaAcquired {
                camera_generation,
                result: media.acquire().await,
            }
        });
    }

    /// Connect with the known credential, or fetch one first
    fn begin_session(&mut self) {
        if self.credential.is_some() {
            if self.transition(SessionStatus::Connecting) {
                self.open_session();
            }
            return;
        }

        if !self.transition(SessionStatus::FetchingCredential) {
            return;
        }

        let credentials = Arc::clone(&self.credentials);
        let interview_type = self.config.interview_type;
        self.spawn_step(async move {
            Completion::CredentialFetched(credentials.fetch_credential(interview_type).await)
        });
    }

    fn open_session(&mut self) {
        let Some(credential) = self.credential.as_ref() else {
            warn!("No credential to open a session with");
            return;
        };

        let attempt = Uuid::new_v4();
        self.attempt = Some(attempt);

        let (signed_url, agent_id) = match credential {
            Credential::SignedUrl(url) => (Some(url.clone()), None),
            Credential::DirectUse => (None, Some(self.config.agents.resolve(self.config.interview_type))),
        };

        info!(
            %attempt,
            signed = signed_url.is_some(),
            tools = ?self.tools.names(),
            agent_id = agent_id.as_deref().unwrap_or("-"),
            "Starting conversation"
        );

        let params = SessionParams {
            signed_url,
            agent_id,
            dynamic_variables: DynamicVariables {
                interview_type: self.config.interview_type.agent_label().to_string(),
            },
            client_tools: self.tools.clone(),
        };
        let session_events = SessionEvents::new(attempt, self.events.clone());

        let conversation = Arc::clone(&self.conversation);
        let completions = self.completions.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let result = conversation.start_session(params, session_events).await;
            if cancel.is_cancelled() {
                // Nobody will own this session; close it rather than leak it
                if let Ok(handle) = result {
                    debug!(%attempt, "Closing session opened after teardown");
                    if let Err(e) = handle.end_session().await {
                        warn!("Failed to close orphaned session: {}", e);
                    }
                }
                return;
            }
            let _ = completions.send(Completion::SessionStarted { attempt, result });
        });
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    fn handle_completion(&mut self, completion: Completion) {
        if self.cancel.is_cancelled() {
            return;
        }

        match completion {
            Completion::MediaAcquired { result: Ok(granted), .. } => {
                if self.status != SessionStatus::AcquiringMedia {
                    return;
                }
                info!(
                    "Capture ready ({} video, {} audio), settling for {:?}",
                    granted.video_tracks, granted.audio_tracks, self.config.settle_delay
                );
                let delay = self.config.settle_delay;
                self.spawn_step(async move {
                    tokio::time::sleep(delay).await;
                    Completion::SettleElapsed
                });
            }

            Completion::MediaAcquired {
                camera_generation,
                result: Err(e),
            } => {
                error!("Initialization stopped, media unavailable: {}", e);
                if camera_generation == self.camera_generation {
                    self.camera_enabled = false;
                }
                self.initializing = false;
                self.last_error = Some(e.user_message().to_string());
                self.transition(SessionStatus::Ended);
            }

            Completion::SettleElapsed => {
                if self.status == SessionStatus::AcquiringMedia {
                    self.begin_session();
                }
            }

            Completion::CameraEnabled { camera_generation, .. }
                if camera_generation != self.camera_generation =>
            {
                debug!("Discarding result of a superseded camera toggle");
            }

            Completion::CameraEnabled { result: Ok(()), .. } => debug!("Camera re-enabled"),

            Completion::CameraEnabled { result: Err(e), .. } => {
                error!("Failed to re-enable camera: {}", e);
                self.camera_enabled = false;
                self.last_error = Some(e.user_message().to_string());
            }

            Completion::CredentialFetched(result) => {
                if self.status != SessionStatus::FetchingCredential {
                    warn!("Credential arrived while {}, discarding", self.status);
                    return;
                }
                match result {
                    Ok(credential) => {
                        self.credential = Some(credential);
                        if self.transition(SessionStatus::Connecting) {
                            self.open_session();
                        }
                    }
                    Err(e) => {
                        error!("Error getting signed URL: {}", e);
                        self.credential_failed = true;
                        self.initializing = false;
                        self.last_error = Some(e.to_string());
                        self.transition(SessionStatus::CredentialFailed);
                    }
                }
            }

            Completion::SessionStarted { attempt, result } => {
                if self.attempt != Some(attempt) {
                    if let Ok(handle) = result {
                        debug!(%attempt, "Closing session from a superseded attempt");
                        self.close_handle(handle);
                    }
                    return;
                }
                match result {
                    Ok(handle) => self.session = Some(handle),
                    Err(e) => {
                        error!("Failed to start conversation: {}", e);
                        self.fail_session(e);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Remote session events
    // ------------------------------------------------------------------

    fn handle_event(&mut self, attempt: Uuid, event: SessionEvent) {
        if self.cancel.is_cancelled() || self.attempt != Some(attempt) {
            debug!(%attempt, ?event, "Ignoring event from inactive session");
            return;
        }

        match event {
            SessionEvent::Connected => {
                if self.status != SessionStatus::Connecting {
                    warn!("Connect acknowledged while {}", self.status);
                    return;
                }
                info!("Connected to conversation service");
                self.enter_active();
            }

            SessionEvent::Disconnected => {
                info!("Disconnected from conversation service");
                match self.status {
                    SessionStatus::Active => {
                        self.attempt = None;
                        self.session = None;
                        self.leave_active();
                    }
                    SessionStatus::Connecting => {
                        self.fail_session(SessionError::Connect(
                            "disconnected before the session was established".to_string(),
                        ));
                    }
                    _ => {}
                }
            }

            SessionEvent::Message(message) => debug!("Message: {}", message),

            SessionEvent::Error(message) => {
                error!("Error: {}", message);
                self.fail_session(SessionError::Runtime(message));
            }

            SessionEvent::Speaking(speaking) => {
                if self.status.is_active() {
                    self.speaking = speaking;
                    self.animator.set_speaking(speaking);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn enter_active(&mut self) {
        if !self.transition(SessionStatus::Active) {
            return;
        }
        self.initializing = false;
        self.credential_failed = false;
        self.last_error = None;
        self.connected_at = Some(Utc::now());

        // Signed URLs authorize a single session
        if matches!(self.credential, Some(Credential::SignedUrl(_))) {
            self.credential = None;
        }

        self.timer.start();
    }

    fn leave_active(&mut self) {
        if self.transition(SessionStatus::Ended) {
            self.timer.stop();
            self.speaking = false;
            self.animator.set_speaking(false);
        }
    }

    /// Remote error or failed connect: end the attempt and raise the flag
    fn fail_session(&mut self, error: SessionError) {
        self.credential_failed = true;
        self.initializing = false;
        self.last_error = Some(error.to_string());

        match self.status {
            SessionStatus::Connecting => {
                self.transition(SessionStatus::CredentialFailed);
            }
            SessionStatus::Active => self.leave_active(),
            _ => return,
        }

        self.attempt = None;
        self.close_session();
    }

    fn transition(&mut self, next: SessionStatus) -> bool {
        if !self.status.can_transition_to(next) {
            warn!("Refusing transition {} -> {}", self.status, next);
            return false;
        }
        info!("Session {} -> {}", self.status, next);
        self.status = next;
        true
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Run one suspension point off the actor loop
    ///
    /// The result is dropped if teardown happened while it was pending.
    fn spawn_step<F>(&self, step: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let completions = self.completions.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let completion = step.await;
            if cancel.is_cancelled() {
                debug!("Discarding result that resolved after teardown");
                return;
            }
            let _ = completions.send(completion);
        });
    }

    fn close_session(&mut self) {
        if let Some(handle) = self.session.take() {
            self.close_handle(handle);
        }
    }

    fn close_handle(&self, handle: Box<dyn ConversationHandle>) {
        tokio::spawn(async move {
            if let Err(e) = handle.end_session().await {
                warn!("Failed to end conversation: {}", e);
            }
        });
    }

    fn view(&self) -> ViewModel {
        ViewModel {
            interview_type: self.config.interview_type,
            status: self.status,
            speaking: self.speaking,
            camera_enabled: self.camera_enabled,
            initializing: self.initializing,
            credential_failed: self.credential_failed,
            last_error: self.last_error.clone(),
            connected_at: self.connected_at,
        }
    }

    fn publish(&self) {
        self.state_tx.send_if_modified(|current| {
            let next = self.view().render();
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// Animation, timer, remote session, then capture devices
    async fn teardown(&mut self) {
        info!("Tearing down rehearsal screen");
        self.cancel.cancel();

        self.animator.stop();
        self.timer.stop();

        self.attempt = None;
        if let Some(handle) = self.session.take() {
            if let Err(e) = handle.end_session().await {
                warn!("Failed to end conversation during teardown: {}", e);
            }
        }

        self.media.release().await;
    }
}

/// Control surface of a running orchestrator
///
/// Dropping the handle tears the screen down.
pub struct OrchestratorHandle {
    actions: mpsc::Sender<UserAction>,
    state: watch::Receiver<PresentationState>,
    elapsed: watch::Receiver<u64>,
    speaking_target: watch::Receiver<SpeakingTarget>,
    media: MediaController,
    task: JoinHandle<ExitReason>,
}

impl OrchestratorHandle {
    pub async fn toggle_camera(&self) -> Result<()> {
        self.send(UserAction::ToggleCamera).await
    }

    pub async fn start(&self) -> Result<()> {
        self.send(UserAction::Start).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(UserAction::Stop).await
    }

    /// Ignored while a session is running
    pub async fn back(&self) -> Result<()> {
        self.send(UserAction::Back).await
    }

    /// Tear down and wait until every resource is released
    pub async fn teardown(self) -> Result<ExitReason> {
        // The actor may already be gone after Back
        let _ = self.actions.send(UserAction::Teardown).await;
        self.closed().await
    }

    /// Wait for the orchestrator to exit
    pub async fn closed(self) -> Result<ExitReason> {
        self.task.await.context("Orchestrator task panicked")
    }

    pub fn state(&self) -> watch::Receiver<PresentationState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> PresentationState {
        self.state.borrow().clone()
    }

    pub fn elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.clone()
    }

    /// Elapsed session time as `HH:MM:SS`
    pub fn elapsed_display(&self) -> String {
        format_elapsed(*self.elapsed.borrow())
    }

    pub fn speaking_target(&self) -> watch::Receiver<SpeakingTarget> {
        self.speaking_target.clone()
    }

    pub fn media(&self) -> &MediaController {
        &self.media
    }

    async fn send(&self, action: UserAction) -> Result<()> {
        self.actions
            .send(action)
            .await
            .context("Orchestrator is no longer running")
    }
}
