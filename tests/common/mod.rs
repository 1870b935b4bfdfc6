// Shared fakes for the orchestration tests
//
// Each fake records what the orchestrator asked of it so tests can assert
// on call counts, parameters and which tracks were stopped.

#![allow(dead_code)]

use interview_coach::conversation::{
    ConversationClient, ConversationHandle, QuestionBank, SessionEvent, SessionEvents,
    SessionParams,
};
use interview_coach::credentials::{Credential, CredentialSource};
use interview_coach::error::{DeviceError, FetchError, SessionError};
use interview_coach::media::{CaptureDevices, MediaConstraints, MediaStream, MediaTrack, TrackKind};
use interview_coach::session::{
    AnimationSurface, OrchestratorConfig, OrchestratorDeps, OrchestratorHandle,
    PresentationState, SessionOrchestrator, SessionStatus, SpeakingTarget,
};
use interview_coach::InterviewType;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};

// ============================================================================
// Capture devices
// ============================================================================

#[derive(Debug)]
pub struct FakeTrack {
    id: String,
    kind: TrackKind,
    live: AtomicBool,
    stops: AtomicUsize,
}

impl FakeTrack {
    pub fn new(id: String, kind: TrackKind) -> Self {
        Self {
            id,
            kind,
            live: AtomicBool::new(true),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaTrack for FakeTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Behaviour of one scripted `open` call
#[derive(Debug, Clone)]
pub struct OpenStep {
    pub delay: Duration,
    pub failure: Option<DeviceError>,
}

#[derive(Default)]
pub struct FakeDevices {
    opened: AtomicUsize,
    failure: Mutex<Option<DeviceError>>,
    delay: Mutex<Option<Duration>>,
    /// Consumed one per `open`, before the global delay/failure apply
    script: Mutex<VecDeque<OpenStep>>,
    issued: Mutex<Vec<Arc<FakeTrack>>>,
    last_constraints: Mutex<Option<MediaConstraints>>,
}

impl FakeDevices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(error: DeviceError) -> Arc<Self> {
        let devices = Self::default();
        *devices.failure.lock().unwrap() = Some(error);
        Arc::new(devices)
    }

    pub fn set_failure(&self, error: Option<DeviceError>) {
        *self.failure.lock().unwrap() = error;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Script the next unscripted `open` call
    pub fn queue_open(&self, delay: Duration, failure: Option<DeviceError>) {
        self.script.lock().unwrap().push_back(OpenStep { delay, failure });
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn last_constraints(&self) -> Option<MediaConstraints> {
        *self.last_constraints.lock().unwrap()
    }

    pub fn tracks(&self, kind: TrackKind) -> Vec<Arc<FakeTrack>> {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == kind)
            .cloned()
            .collect()
    }

    /// Total `stop()` calls on microphone tracks
    pub fn audio_stops(&self) -> usize {
        self.tracks(TrackKind::Audio).iter().map(|t| t.stop_count()).sum()
    }

    pub fn live_tracks(&self) -> usize {
        self.issued.lock().unwrap().iter().filter(|t| t.is_live()).count()
    }
}

#[async_trait::async_trait]
impl CaptureDevices for FakeDevices {
    async fn open(&self, constraints: &MediaConstraints) -> Result<MediaStream, DeviceError> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_constraints.lock().unwrap() = Some(*constraints);

        let step = self.script.lock().unwrap().pop_front();
        let (delay, failure) = match step {
            Some(step) => (Some(step.delay), step.failure),
            None => (*self.delay.lock().unwrap(), self.failure.lock().unwrap().clone()),
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = failure {
            return Err(error);
        }

        let video = Arc::new(FakeTrack::new(format!("video-{}", n), TrackKind::Video));
        let audio = Arc::new(FakeTrack::new(format!("audio-{}", n), TrackKind::Audio));
        {
            let mut issued = self.issued.lock().unwrap();
            issued.push(Arc::clone(&video));
            issued.push(Arc::clone(&audio));
        }

        Ok(MediaStream::new(vec![
            video as Arc<dyn MediaTrack>,
            audio as Arc<dyn MediaTrack>,
        ]))
    }

    fn name(&self) -> &str {
        "fake devices"
    }
}

// ============================================================================
// Credentials
// ============================================================================

pub struct FakeCredentials {
    calls: AtomicUsize,
    completed: AtomicUsize,
    queued: Mutex<VecDeque<Result<Credential, FetchError>>>,
    fallback: Result<Credential, FetchError>,
    gate: Option<Arc<Notify>>,
}

impl FakeCredentials {
    pub fn always(result: Result<Credential, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            queued: Mutex::new(VecDeque::new()),
            fallback: result,
            gate: None,
        })
    }

    /// Answers from `queue` first, then `fallback`
    pub fn sequence(
        queue: Vec<Result<Credential, FetchError>>,
        fallback: Result<Credential, FetchError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            queued: Mutex::new(queue.into()),
            fallback,
            gate: None,
        })
    }

    /// Holds every answer until the returned `Notify` fires
    pub fn gated(result: Result<Credential, FetchError>) -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let creds = Arc::new(Self {
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            queued: Mutex::new(VecDeque::new()),
            fallback: result,
            gate: Some(Arc::clone(&gate)),
        });
        (creds, gate)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

pub fn http_500() -> FetchError {
    FetchError::Status {
        status: 500,
        reason: "Internal Server Error".to_string(),
    }
}

#[async_trait::async_trait]
impl CredentialSource for FakeCredentials {
    async fn fetch_credential(&self, _interview_type: InterviewType) -> Result<Credential, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.queued.lock().unwrap().pop_front();
        self.completed.fetch_add(1, Ordering::SeqCst);
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

// ============================================================================
// Conversation service
// ============================================================================

pub struct FakeHandle {
    ends: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ConversationHandle for FakeHandle {
    async fn end_session(&self) -> Result<(), SessionError> {
        self.ends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeConversation {
    auto_connect: bool,
    starts: AtomicUsize,
    ends: Arc<AtomicUsize>,
    failures: Mutex<VecDeque<SessionError>>,
    params: Mutex<Vec<SessionParams>>,
    events: Mutex<Vec<SessionEvents>>,
}

impl FakeConversation {
    /// Acknowledges the connection as soon as the session starts
    pub fn connecting() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    /// Leaves the connect acknowledgment to the test
    pub fn manual() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    fn build(auto_connect: bool) -> Self {
        Self {
            auto_connect,
            starts: AtomicUsize::new(0),
            ends: Arc::new(AtomicUsize::new(0)),
            failures: Mutex::new(VecDeque::new()),
            params: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(&self, error: SessionError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn end_count(&self) -> usize {
        self.ends.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> SessionParams {
        self.params
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no session was started")
    }

    /// Event sink of the most recent attempt
    pub fn events(&self) -> SessionEvents {
        self.events
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no session was started")
    }

    pub fn emit(&self, event: SessionEvent) {
        self.events().emit(event);
    }
}

#[async_trait::async_trait]
impl ConversationClient for FakeConversation {
    async fn start_session(
        &self,
        params: SessionParams,
        events: SessionEvents,
    ) -> Result<Box<dyn ConversationHandle>, SessionError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.params.lock().unwrap().push(params);
        self.events.lock().unwrap().push(events.clone());

        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        if self.auto_connect {
            events.emit(SessionEvent::Connected);
        }

        Ok(Box::new(FakeHandle {
            ends: Arc::clone(&self.ends),
        }))
    }
}

// ============================================================================
// Question bank and animation surface
// ============================================================================

pub struct FakeQuestionBank;

impl QuestionBank for FakeQuestionBank {
    fn question_for(&self, interview_type: InterviewType, category: &str, difficulty: &str) -> String {
        format!("[{}] {} question ({})", interview_type, category, difficulty)
    }
}

#[derive(Default)]
pub struct RecordingSurface {
    targets: Mutex<Vec<SpeakingTarget>>,
}

impl RecordingSurface {
    pub fn targets(&self) -> Vec<SpeakingTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl AnimationSurface for RecordingSurface {
    fn animate(&self, target: SpeakingTarget) {
        self.targets.lock().unwrap().push(target);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub handle: OrchestratorHandle,
    pub devices: Arc<FakeDevices>,
    pub credentials: Arc<FakeCredentials>,
    pub conversation: Arc<FakeConversation>,
}

pub fn spawn_orchestrator(
    config: OrchestratorConfig,
    devices: Arc<FakeDevices>,
    credentials: Arc<FakeCredentials>,
    conversation: Arc<FakeConversation>,
) -> Harness {
    let deps = OrchestratorDeps {
        devices: devices.clone(),
        credentials: credentials.clone(),
        conversation: conversation.clone(),
        questions: Arc::new(FakeQuestionBank),
    };

    Harness {
        handle: SessionOrchestrator::new(config, deps).spawn(),
        devices,
        credentials,
        conversation,
    }
}

/// Wait (in virtual time when paused) until the screen state satisfies `f`
pub async fn wait_for<F>(rx: &mut watch::Receiver<PresentationState>, f: F) -> PresentationState
where
    F: FnMut(&PresentationState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(60), rx.wait_for(f))
        .await
        .expect("timed out waiting for state")
        .expect("orchestrator stopped")
        .clone()
}

pub async fn wait_for_status(
    rx: &mut watch::Receiver<PresentationState>,
    status: SessionStatus,
) -> PresentationState {
    wait_for(rx, |s| s.status == status).await
}

/// Let every runnable task make progress
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
