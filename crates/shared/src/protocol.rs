use serde::{Deserialize, Serialize};

pub const TUTORIAL_STEPS_PATH: [&str; 2] = ["tutorial", "steps"];
pub const SANDBOX_RUN_PATH: [&str; 2] = ["sandbox", "run"];
pub const SANDBOX_CONTENT_TYPE: &str = "text/plain";
pub const DEFAULT_EXAMPLES_PATH: &str = "/examples";

/// Completed response from the sandbox runner. Transport failures never produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResponse {
    pub status: u16,
    pub body: String,
}

impl RunResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_counts_as_success() {
        assert!(RunResponse::new(200, "ok").is_success());
        assert!(RunResponse::new(204, "").is_success());
        assert!(!RunResponse::new(302, "").is_success());
        assert!(!RunResponse::new(500, "").is_success());
    }
}
