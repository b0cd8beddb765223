use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use shared::{
    domain::{NavState, NextAction, StepId},
    error::RemoteError,
    protocol::DEFAULT_EXAMPLES_PATH,
};
use thiserror::Error;
use tokio::{
    sync::Mutex,
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, error, info, warn};

use crate::{source::FragmentSource, surface::TutorialSurface};

pub const STEP_UNAVAILABLE_HTML: &str =
    r#"<article class="tutorial-section"><p>Unable to load this step.</p></article>"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigatorError {
    #[error("tutorial needs at least one step")]
    NoSteps,
    #[error("duplicate tutorial step id: {0}")]
    DuplicateStep(StepId),
}

#[derive(Debug, Clone)]
pub struct NavigatorConfig {
    pub examples_path: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            examples_path: DEFAULT_EXAMPLES_PATH.to_string(),
        }
    }
}

/// What a navigation request did.
#[derive(Debug)]
pub enum Navigation {
    /// Empty target or the step already shown.
    Unchanged,
    /// Target is not part of the tutorial.
    Rejected,
    /// Served from the fragment cache.
    Rendered,
    Fetching(StepFetch),
    Redirected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// Superseded by a later navigation, or the task never finished.
    Discarded,
}

/// Handle to an in-flight fragment request.
#[derive(Debug)]
pub struct StepFetch {
    step: StepId,
    task: JoinHandle<FetchOutcome>,
}

impl StepFetch {
    pub fn step(&self) -> &StepId {
        &self.step
    }

    pub async fn finished(self) -> FetchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => FetchOutcome::Discarded,
            Err(err) => {
                error!("tutorial: fetch task failed step={} error={err}", self.step);
                FetchOutcome::Discarded
            }
        }
    }
}

/// Derive the prev/next controls for `current`. `None` if `current` is not in `order`.
pub fn derive_nav_state(order: &[StepId], current: &StepId) -> Option<NavState> {
    let index = order.iter().position(|step| step == current)?;
    let previous = index
        .checked_sub(1)
        .and_then(|prev| order.get(prev))
        .cloned();
    let next = match order.get(index + 1) {
        Some(step) => NextAction::Advance(step.clone()),
        None => NextAction::ExitToExamples,
    };
    Some(NavState {
        current: current.clone(),
        previous,
        next,
    })
}

struct InFlightFetch {
    step: StepId,
    abort: AbortHandle,
}

struct NavigatorState {
    current: StepId,
    cache: HashMap<StepId, String>,
    generation: u64,
    in_flight: Option<InFlightFetch>,
}

pub struct TutorialNavigator {
    order: Vec<StepId>,
    config: NavigatorConfig,
    fragments: Arc<dyn FragmentSource>,
    surface: Arc<dyn TutorialSurface>,
    state: Mutex<NavigatorState>,
}

impl TutorialNavigator {
    /// Build a navigator over the declared step selectors. Empty ids are skipped.
    pub fn new(
        steps: impl IntoIterator<Item = StepId>,
        config: NavigatorConfig,
        fragments: Arc<dyn FragmentSource>,
        surface: Arc<dyn TutorialSurface>,
    ) -> Result<Arc<Self>, NavigatorError> {
        let order: Vec<StepId> = steps.into_iter().filter(|step| !step.is_empty()).collect();
        let mut seen = HashSet::new();
        for step in &order {
            if !seen.insert(step) {
                return Err(NavigatorError::DuplicateStep(step.clone()));
            }
        }
        let current = order.first().cloned().ok_or(NavigatorError::NoSteps)?;

        Ok(Arc::new(Self {
            order,
            config,
            fragments,
            surface,
            state: Mutex::new(NavigatorState {
                current,
                cache: HashMap::new(),
                generation: 0,
                in_flight: None,
            }),
        }))
    }

    /// Load the first step. Unlike [`go_to`](Self::go_to) this runs even though
    /// the first step is already the current one.
    pub async fn initialize(self: &Arc<Self>) -> Navigation {
        let mut state = self.state.lock().await;
        let first = state.current.clone();
        self.load_step(&mut state, first)
    }

    pub async fn go_to(self: &Arc<Self>, step: impl Into<StepId>) -> Navigation {
        let step = step.into();
        if step.is_empty() {
            return Navigation::Unchanged;
        }
        if !self.order.contains(&step) {
            warn!("tutorial: ignoring unknown step={step}");
            return Navigation::Rejected;
        }

        let mut state = self.state.lock().await;
        if state.current == step {
            // The visible step is the latest request; drop any fetch for another step.
            let stale = state
                .in_flight
                .as_ref()
                .is_some_and(|fetch| fetch.step != step);
            if stale {
                self.supersede(&mut state);
            }
            return Navigation::Unchanged;
        }
        self.load_step(&mut state, step)
    }

    pub async fn previous(self: &Arc<Self>) -> Navigation {
        let target = self.nav_state().await.and_then(|nav| nav.previous);
        match target {
            Some(step) => self.go_to(step).await,
            None => Navigation::Unchanged,
        }
    }

    pub async fn next(self: &Arc<Self>) -> Navigation {
        let Some(nav) = self.nav_state().await else {
            return Navigation::Unchanged;
        };
        match nav.next {
            NextAction::Advance(step) => self.go_to(step).await,
            NextAction::ExitToExamples => {
                info!(
                    "tutorial: finished step={} redirect={}",
                    nav.current, self.config.examples_path
                );
                self.surface.redirect(&self.config.examples_path);
                Navigation::Redirected
            }
        }
    }

    pub async fn current_step(&self) -> StepId {
        self.state.lock().await.current.clone()
    }

    pub async fn nav_state(&self) -> Option<NavState> {
        let state = self.state.lock().await;
        derive_nav_state(&self.order, &state.current)
    }

    pub async fn is_cached(&self, step: &StepId) -> bool {
        self.state.lock().await.cache.contains_key(step)
    }

    /// Cached steps in tutorial order.
    pub async fn cached_steps(&self) -> Vec<StepId> {
        let state = self.state.lock().await;
        self.order
            .iter()
            .filter(|step| state.cache.contains_key(*step))
            .cloned()
            .collect()
    }

    pub fn steps(&self) -> &[StepId] {
        &self.order
    }

    fn supersede(&self, state: &mut NavigatorState) {
        state.generation = state.generation.wrapping_add(1);
        if let Some(stale) = state.in_flight.take() {
            debug!("tutorial: cancelling superseded fetch step={}", stale.step);
            stale.abort.abort();
        }
    }

    fn load_step(self: &Arc<Self>, state: &mut NavigatorState, step: StepId) -> Navigation {
        self.supersede(state);

        if let Some(html) = state.cache.get(&step).cloned() {
            debug!("tutorial: cache hit step={step}");
            self.render(state, step, &html);
            return Navigation::Rendered;
        }

        let generation = state.generation;
        let navigator = Arc::clone(self);
        let requested = step.clone();
        let task = tokio::spawn(async move {
            let result = navigator.fragments.fetch_step(&requested).await;
            navigator.apply_fetch(requested, generation, result).await
        });
        state.in_flight = Some(InFlightFetch {
            step: step.clone(),
            abort: task.abort_handle(),
        });
        Navigation::Fetching(StepFetch { step, task })
    }

    async fn apply_fetch(
        &self,
        step: StepId,
        generation: u64,
        result: Result<String, RemoteError>,
    ) -> FetchOutcome {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("tutorial: discarding stale fetch step={step} generation={generation}");
            return FetchOutcome::Discarded;
        }
        state.in_flight = None;

        let html = match result {
            Ok(html) => {
                info!("tutorial: loaded step={step} bytes={}", html.len());
                state.cache.insert(step.clone(), html.clone());
                html
            }
            Err(err) => {
                warn!(
                    "tutorial: failed to load step={step} kind={:?} error={err}",
                    err.kind()
                );
                STEP_UNAVAILABLE_HTML.to_string()
            }
        };
        self.render(&mut state, step, &html);
        FetchOutcome::Applied
    }

    fn render(&self, state: &mut NavigatorState, step: StepId, html: &str) {
        self.surface.render_stage(html);
        state.current = step;
        if let Some(nav) = derive_nav_state(&self.order, &state.current) {
            self.surface.render_nav(&nav);
        }
    }
}

#[cfg(test)]
#[path = "tests/navigator_tests.rs"]
mod tests;
