use std::{fmt, sync::Arc};

use shared::{
    domain::{RunStatus, SampleKey, StatusTone},
    error::{FailureKind, RemoteError},
    protocol::RunResponse,
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info};

use crate::{samples::SampleLibrary, source::ExecutionSource, surface::SandboxSurface};

const EMPTY_SOURCE_STATUS: &str = "Enter code first";
const RUNNING_STATUS: &str = "Running...";
const RUNNING_OUTPUT: &str = "Building project inside Docker...";
const COMPLETED_STATUS: &str = "Completed";
const FAILED_STATUS: &str = "Failed";
const ERROR_STATUS: &str = "Error";
const RESET_STATUS: &str = "Sample loaded";
const RESET_OUTPUT: &str = "Click \"Run code\" to see stdout...";
const SAMPLE_READY_OUTPUT: &str = "Ready to run.";
const NO_OUTPUT: &str = "(no output)";
pub const RUN_FAILED_OUTPUT: &str = "Sandbox run failed.";
pub const UNREACHABLE_OUTPUT: &str = "Unable to reach the sandbox endpoint.";

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Language name used in user-facing messages.
    pub language_name: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            language_name: "AFlat".to_string(),
        }
    }
}

impl SandboxConfig {
    pub fn empty_source_output(&self) -> String {
        format!("No {} source provided.", self.language_name)
    }
}

/// Result of pressing the run control.
#[derive(Debug)]
pub enum RunTrigger {
    /// Buffer was blank; status is `Failed` and nothing was sent.
    EmptySource,
    /// A run is already pending.
    Busy,
    Started(RunHandle),
}

pub struct RunHandle {
    controller: Arc<SandboxController>,
    task: JoinHandle<RunStatus>,
}

impl RunHandle {
    /// Wait for the run to settle. A run task that died mid-flight settles as `Error`.
    pub async fn finished(self) -> RunStatus {
        match self.task.await {
            Ok(status) => status,
            Err(err) => {
                error!("sandbox: run task failed error={err}");
                self.controller.abandon_run().await
            }
        }
    }
}

impl fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

struct SandboxState {
    source: String,
    status: RunStatus,
}

/// Editor buffer plus the run lifecycle against the remote runner.
pub struct SandboxController {
    config: SandboxConfig,
    samples: SampleLibrary,
    execution: Arc<dyn ExecutionSource>,
    surface: Arc<dyn SandboxSurface>,
    state: Mutex<SandboxState>,
}

impl SandboxController {
    /// Create the controller with the default sample loaded.
    pub fn new(
        config: SandboxConfig,
        samples: SampleLibrary,
        execution: Arc<dyn ExecutionSource>,
        surface: Arc<dyn SandboxSurface>,
    ) -> Arc<Self> {
        let source = samples.default_sample().source.clone();
        let controller = Self {
            config,
            samples,
            execution,
            surface,
            state: Mutex::new(SandboxState {
                source,
                status: RunStatus::Idle,
            }),
        };
        controller.surface.set_run_enabled(true);
        controller.show_reset();
        Arc::new(controller)
    }

    pub async fn source(&self) -> String {
        self.state.lock().await.source.clone()
    }

    pub async fn run_status(&self) -> RunStatus {
        self.state.lock().await.status
    }

    pub async fn is_run_enabled(&self) -> bool {
        !self.run_status().await.is_pending()
    }

    /// Replace the buffer with what the user typed.
    pub async fn edit_source(&self, source: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.source = source.into();
    }

    /// Load a sample into the editor. Unknown keys are ignored.
    pub async fn load_sample(&self, key: &SampleKey) -> bool {
        let Some(sample) = self.samples.get(key) else {
            debug!("sandbox: ignoring unknown sample key={key}");
            return false;
        };
        let mut state = self.state.lock().await;
        state.source = sample.source.clone();
        self.surface.show_source(&state.source);
        self.surface
            .set_status(&format!("Loaded {}", sample.label), StatusTone::Info);
        self.surface.set_output(SAMPLE_READY_OUTPUT);
        true
    }

    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.source = self.samples.default_sample().source.clone();
        self.show_reset();
    }

    pub async fn trigger_run(self: &Arc<Self>) -> RunTrigger {
        info!("sandbox: run requested");
        let mut state = self.state.lock().await;
        if state.status.is_pending() {
            debug!("sandbox: run already pending");
            return RunTrigger::Busy;
        }

        let source = state.source.trim().to_string();
        if source.is_empty() {
            info!("sandbox: run rejected kind={:?}", FailureKind::EmptyInput);
            state.status = RunStatus::Failed;
            self.surface
                .set_status(EMPTY_SOURCE_STATUS, StatusTone::Error);
            self.show_output(&self.config.empty_source_output());
            return RunTrigger::EmptySource;
        }

        // Render before entering pending so a failing surface cannot strand the lock.
        self.surface.set_run_enabled(false);
        self.surface
            .set_status(RUNNING_STATUS, RunStatus::Pending.tone());
        self.show_output(RUNNING_OUTPUT);
        state.status = RunStatus::Pending;

        let controller = Arc::clone(self);
        let task = tokio::spawn(async move { controller.execute(source).await });
        RunTrigger::Started(RunHandle {
            controller: Arc::clone(self),
            task,
        })
    }

    /// Trigger a run and wait for it to settle.
    pub async fn run(self: &Arc<Self>) -> RunStatus {
        match self.trigger_run().await {
            RunTrigger::Started(handle) => handle.finished().await,
            RunTrigger::EmptySource => RunStatus::Failed,
            RunTrigger::Busy => RunStatus::Pending,
        }
    }

    async fn execute(&self, source: String) -> RunStatus {
        let execution = Arc::clone(&self.execution);
        // The request runs in its own task so a panicking source still releases the run control.
        let request = tokio::spawn(async move { execution.run(&source).await });
        let result = match request.await {
            Ok(result) => result,
            Err(err) => Err(RemoteError::transport(format!(
                "sandbox request task failed: {err}"
            ))),
        };
        self.finish(result).await
    }

    async fn finish(&self, result: Result<RunResponse, RemoteError>) -> RunStatus {
        let (status, label, output) = match result {
            Ok(response) if response.is_success() => {
                info!("sandbox: run completed status={}", response.status);
                (RunStatus::Success, COMPLETED_STATUS, response.body)
            }
            Ok(RunResponse { status, body }) | Err(RemoteError::Rejected { status, body }) => {
                info!(
                    "sandbox: run rejected kind={:?} status={status}",
                    FailureKind::RemoteRejection
                );
                let output = if body.is_empty() {
                    RUN_FAILED_OUTPUT.to_string()
                } else {
                    body
                };
                (RunStatus::Failed, FAILED_STATUS, output)
            }
            Err(err @ RemoteError::Transport(_)) => {
                error!("sandbox: endpoint unreachable kind={:?} error={err}", err.kind());
                (RunStatus::Error, ERROR_STATUS, UNREACHABLE_OUTPUT.to_string())
            }
        };

        // Settle and release before touching the surface.
        let mut state = self.state.lock().await;
        state.status = status;
        self.surface.set_run_enabled(true);
        self.surface.set_status(label, status.tone());
        self.show_output(&output);
        status
    }

    /// Settle a run whose task never reached `finish`.
    async fn abandon_run(&self) -> RunStatus {
        let mut state = self.state.lock().await;
        if state.status.is_pending() {
            state.status = RunStatus::Error;
            self.surface.set_run_enabled(true);
        }
        state.status
    }

    fn show_reset(&self) {
        let sample = self.samples.default_sample();
        self.surface.show_source(&sample.source);
        self.surface.set_status(RESET_STATUS, StatusTone::Info);
        self.show_output(RESET_OUTPUT);
    }

    fn show_output(&self, text: &str) {
        self.surface
            .set_output(if text.is_empty() { NO_OUTPUT } else { text });
    }
}

#[cfg(test)]
#[path = "tests/sandbox_tests.rs"]
mod tests;
