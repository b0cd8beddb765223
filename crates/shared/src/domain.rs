use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

key_newtype!(StepId);
key_newtype!(SampleKey);

/// Lifecycle of a sandbox run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Failed,
    Error,
}

impl RunStatus {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    pub fn tone(self) -> StatusTone {
        match self {
            Self::Idle => StatusTone::Info,
            Self::Pending => StatusTone::Pending,
            Self::Success => StatusTone::Success,
            Self::Failed | Self::Error => StatusTone::Error,
        }
    }
}

/// Styling hint attached to the sandbox status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Info,
    Pending,
    Success,
    Error,
}

impl StatusTone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "target", rename_all = "snake_case")]
pub enum NextAction {
    Advance(StepId),
    ExitToExamples,
}

impl NextAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Advance(_) => "Next step",
            Self::ExitToExamples => "Browse examples",
        }
    }
}

/// Prev/next control state derived from the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavState {
    pub current: StepId,
    pub previous: Option<StepId>,
    pub next: NextAction,
}

impl NavState {
    pub fn previous_enabled(&self) -> bool {
        self.previous.is_some()
    }

    pub fn next_target(&self) -> Option<&StepId> {
        match &self.next {
            NextAction::Advance(step) => Some(step),
            NextAction::ExitToExamples => None,
        }
    }

    pub fn is_exit(&self) -> bool {
        self.next == NextAction::ExitToExamples
    }

    pub fn next_label(&self) -> &'static str {
        self.next.label()
    }
}
