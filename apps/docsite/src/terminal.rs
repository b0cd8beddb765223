//! Renders controller output as tagged lines on a terminal.

use std::{
    io::{self, Write},
    sync::Mutex,
};

use shared::domain::{NavState, StatusTone};
use site_core::{SandboxSurface, TutorialSurface};
use tracing::warn;
use url::Url;

/// Where surface lines go. JSON mode keeps stdout for the summary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn for_json(json: bool) -> Self {
        if json {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }
}

pub struct TerminalSurface {
    out: Mutex<Box<dyn Write + Send>>,
    site_url: Url,
    redirected_to: Mutex<Option<String>>,
}

impl TerminalSurface {
    pub fn console(stream: Stream, site_url: Url) -> Self {
        let out: Box<dyn Write + Send> = match stream {
            Stream::Stdout => Box::new(io::stdout()),
            Stream::Stderr => Box::new(io::stderr()),
        };
        Self::new(out, site_url)
    }

    pub fn new(out: Box<dyn Write + Send>, site_url: Url) -> Self {
        Self {
            out: Mutex::new(out),
            site_url,
            redirected_to: Mutex::new(None),
        }
    }

    /// Absolute URL of the last redirect, if the tutorial was left.
    pub fn redirected_to(&self) -> Option<String> {
        self.redirected_to
            .lock()
            .ok()
            .and_then(|target| target.clone())
    }

    fn line(&self, tag: &str, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let result = if text.contains('\n') {
            writeln!(out, "[{tag}]\n{}", text.trim_end_matches('\n'))
        } else {
            writeln!(out, "[{tag}] {text}")
        };
        if let Err(err) = result.and_then(|()| out.flush()) {
            warn!("terminal: write failed tag={tag} error={err}");
        }
    }
}

impl TutorialSurface for TerminalSurface {
    fn render_stage(&self, html: &str) {
        self.line("stage", html);
    }

    fn render_nav(&self, nav: &NavState) {
        let previous = nav.previous.as_ref().map_or("-", |step| step.as_str());
        let next = nav.next_target().map_or("-", |step| step.as_str());
        self.line(
            "nav",
            &format!(
                "current={} prev={previous} next={next} ({})",
                nav.current,
                nav.next_label()
            ),
        );
    }

    fn redirect(&self, path: &str) {
        let target = match self.site_url.join(path) {
            Ok(url) => url.to_string(),
            Err(_) => path.to_string(),
        };
        self.line("redirect", &target);
        if let Ok(mut redirected) = self.redirected_to.lock() {
            *redirected = Some(target);
        }
    }
}

impl SandboxSurface for TerminalSurface {
    fn show_source(&self, source: &str) {
        self.line("source", &format!("{} lines", source.lines().count()));
    }

    fn set_status(&self, label: &str, tone: StatusTone) {
        self.line(&format!("status:{}", tone.as_str()), label);
    }

    fn set_output(&self, text: &str) {
        self.line("output", text);
    }

    fn set_run_enabled(&self, enabled: bool) {
        self.line("run", if enabled { "enabled" } else { "disabled" });
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
