use async_trait::async_trait;
use shared::{domain::StepId, error::RemoteError, protocol::RunResponse};

#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Fetch the markup of one tutorial step. Non-success statuses are errors.
    async fn fetch_step(&self, step: &StepId) -> Result<String, RemoteError>;
}

#[async_trait]
pub trait ExecutionSource: Send + Sync {
    /// Submit source text to the runner. Only transport failures are errors;
    /// a rejected run comes back as a non-success [`RunResponse`].
    async fn run(&self, source: &str) -> Result<RunResponse, RemoteError>;
}
