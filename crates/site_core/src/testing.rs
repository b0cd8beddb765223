//! In-memory surfaces and sources for exercising the controllers without a browser or server.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use shared::{
    domain::{NavState, StatusTone, StepId},
    error::RemoteError,
    protocol::RunResponse,
};
use tokio::sync::oneshot;

use crate::{
    source::{ExecutionSource, FragmentSource},
    surface::{SandboxSurface, TutorialSurface},
};

#[derive(Default)]
pub struct RecordingTutorialSurface {
    stages: Mutex<Vec<String>>,
    navs: Mutex<Vec<NavState>>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingTutorialSurface {
    pub fn stages(&self) -> Vec<String> {
        self.stages.lock().expect("stages lock").clone()
    }

    pub fn last_stage(&self) -> Option<String> {
        self.stages.lock().expect("stages lock").last().cloned()
    }

    pub fn navs(&self) -> Vec<NavState> {
        self.navs.lock().expect("navs lock").clone()
    }

    pub fn last_nav(&self) -> Option<NavState> {
        self.navs.lock().expect("navs lock").last().cloned()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().expect("redirects lock").clone()
    }
}

impl TutorialSurface for RecordingTutorialSurface {
    fn render_stage(&self, html: &str) {
        self.stages.lock().expect("stages lock").push(html.to_string());
    }

    fn render_nav(&self, nav: &NavState) {
        self.navs.lock().expect("navs lock").push(nav.clone());
    }

    fn redirect(&self, path: &str) {
        self.redirects
            .lock()
            .expect("redirects lock")
            .push(path.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxEvent {
    Source(String),
    Status(String, StatusTone),
    Output(String),
    RunEnabled(bool),
}

#[derive(Default)]
pub struct RecordingSandboxSurface {
    events: Mutex<Vec<SandboxEvent>>,
}

impl RecordingSandboxSurface {
    pub fn events(&self) -> Vec<SandboxEvent> {
        self.events.lock().expect("events lock").clone()
    }

    pub fn clear(&self) {
        self.events.lock().expect("events lock").clear();
    }

    pub fn source(&self) -> Option<String> {
        self.find(|event| match event {
            SandboxEvent::Source(source) => Some(source.clone()),
            _ => None,
        })
    }

    pub fn status(&self) -> Option<(String, StatusTone)> {
        self.find(|event| match event {
            SandboxEvent::Status(label, tone) => Some((label.clone(), *tone)),
            _ => None,
        })
    }

    pub fn output(&self) -> Option<String> {
        self.find(|event| match event {
            SandboxEvent::Output(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn run_enabled(&self) -> Option<bool> {
        self.find(|event| match event {
            SandboxEvent::RunEnabled(enabled) => Some(*enabled),
            _ => None,
        })
    }

    fn find<T>(&self, pick: impl Fn(&SandboxEvent) -> Option<T>) -> Option<T> {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .rev()
            .find_map(pick)
    }

    fn push(&self, event: SandboxEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl SandboxSurface for RecordingSandboxSurface {
    fn show_source(&self, source: &str) {
        self.push(SandboxEvent::Source(source.to_string()));
    }

    fn set_status(&self, label: &str, tone: StatusTone) {
        self.push(SandboxEvent::Status(label.to_string(), tone));
    }

    fn set_output(&self, text: &str) {
        self.push(SandboxEvent::Output(text.to_string()));
    }

    fn set_run_enabled(&self, enabled: bool) {
        self.push(SandboxEvent::RunEnabled(enabled));
    }
}

/// Fragment source answering from a fixed table. Unknown steps are rejected with 404.
#[derive(Default)]
pub struct FragmentStub {
    responses: HashMap<StepId, Result<String, RemoteError>>,
    holds: Mutex<HashMap<StepId, oneshot::Receiver<()>>>,
    requests: Mutex<Vec<StepId>>,
}

impl FragmentStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: &str, html: &str) -> Self {
        self.responses
            .insert(StepId::from(step), Ok(html.to_string()));
        self
    }

    pub fn with_failure(mut self, step: &str, err: RemoteError) -> Self {
        self.responses.insert(StepId::from(step), Err(err));
        self
    }

    /// Park the next fetch of `step` until the returned sender fires or is dropped.
    pub fn hold(&self, step: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds
            .lock()
            .expect("holds lock")
            .insert(StepId::from(step), rx);
        tx
    }

    pub fn requests(&self) -> Vec<StepId> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl FragmentSource for FragmentStub {
    async fn fetch_step(&self, step: &StepId) -> Result<String, RemoteError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(step.clone());
        let hold = self.holds.lock().expect("holds lock").remove(step);
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        self.responses
            .get(step)
            .cloned()
            .unwrap_or_else(|| Err(RemoteError::rejected(404, "")))
    }
}

/// Execution source replaying scripted responses in order.
#[derive(Default)]
pub struct ExecutionStub {
    responses: Mutex<VecDeque<Result<RunResponse, RemoteError>>>,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
    submissions: Mutex<Vec<String>>,
}

impl ExecutionStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(Ok(RunResponse::new(status, body)));
        self
    }

    pub fn fail(self, err: RemoteError) -> Self {
        self.push(Err(err));
        self
    }

    /// Park the next run until the returned sender fires or is dropped.
    pub fn hold(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.lock().expect("hold lock") = Some(rx);
        tx
    }

    pub fn submissions(&self) -> Vec<String> {
        self.submissions.lock().expect("submissions lock").clone()
    }

    fn push(&self, response: Result<RunResponse, RemoteError>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
    }
}

#[async_trait]
impl ExecutionSource for ExecutionStub {
    async fn run(&self, source: &str) -> Result<RunResponse, RemoteError> {
        self.submissions
            .lock()
            .expect("submissions lock")
            .push(source.to_string());
        let hold = self.hold.lock().expect("hold lock").take();
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::transport("no scripted response")))
    }
}
