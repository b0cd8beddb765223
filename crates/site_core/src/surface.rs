//! Rendering sinks the controllers write into.
//!
//! Implementations must not call back into the controller that owns them; the
//! controllers invoke these while holding their own state lock.

use shared::domain::{NavState, StatusTone};

pub trait TutorialSurface: Send + Sync {
    /// Replace the stage markup with a step fragment.
    fn render_stage(&self, html: &str);
    /// Refresh the active step selector and the prev/next controls.
    fn render_nav(&self, nav: &NavState);
    /// Leave the tutorial with a full page load.
    fn redirect(&self, path: &str);
}

pub trait SandboxSurface: Send + Sync {
    fn show_source(&self, source: &str);
    fn set_status(&self, label: &str, tone: StatusTone);
    fn set_output(&self, text: &str);
    fn set_run_enabled(&self, enabled: bool);
}
