//! Controller core for the language documentation site.
//!
//! Two stateful components live here: [`TutorialNavigator`], which walks the
//! tutorial step fragments, and [`SandboxController`], which submits editor
//! source to the remote runner. Both write to an injected surface and talk to
//! injected sources, so the browser bindings and the terminal driver share the
//! same state machines.

pub mod http;
pub mod navigator;
pub mod samples;
pub mod sandbox;
pub mod source;
pub mod surface;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use http::SiteClient;
pub use navigator::{
    FetchOutcome, Navigation, NavigatorConfig, NavigatorError, StepFetch, TutorialNavigator,
};
pub use samples::{Sample, SampleLibrary, SampleLibraryError};
pub use sandbox::{RunHandle, RunTrigger, SandboxConfig, SandboxController};
pub use source::{ExecutionSource, FragmentSource};
pub use surface::{SandboxSurface, TutorialSurface};
