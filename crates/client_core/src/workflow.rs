use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::domain::{Band, BandId};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    error::SubmitError,
    fetcher::{BandFetcher, FetchTicket, RequestTracker},
    navigation::{Navigator, Route},
    source::{BandSource, BandUpdater},
    validation::{current_year, BandFormValues, Field, ValidationErrors, ValidationSchema},
};

/// How long the success banner stays up before moving to the detail view.
pub const NAVIGATION_DELAY: Duration = Duration::from_secs(2);
pub const SUBMIT_LABEL: &str = "Update Band";
pub const SUBMITTING_LABEL: &str = "Updating Band...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Loading,
    NotFound,
    Ready,
    Submitting,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusBanner {
    Success(String),
    Error(String),
}

impl StatusBanner {
    pub fn message(&self) -> &str {
        match self {
            StatusBanner::Success(message) | StatusBanner::Error(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub band_id: BandId,
    pub heading: String,
    pub back_link: Route,
    pub values: BandFormValues,
    pub errors: ValidationErrors,
    pub status: Option<StatusBanner>,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}

/// What the surrounding view layer renders for an edit mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditViewState {
    Loading,
    NotFound,
    Ready(EditForm),
    Submitting(EditForm),
    Success(EditForm),
}

impl EditViewState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            EditViewState::Loading => WorkflowPhase::Loading,
            EditViewState::NotFound => WorkflowPhase::NotFound,
            EditViewState::Ready(_) => WorkflowPhase::Ready,
            EditViewState::Submitting(_) => WorkflowPhase::Submitting,
            EditViewState::Success(_) => WorkflowPhase::Success,
        }
    }

    pub fn form(&self) -> Option<&EditForm> {
        match self {
            EditViewState::Ready(form)
            | EditViewState::Submitting(form)
            | EditViewState::Success(form) => Some(form),
            EditViewState::Loading | EditViewState::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Invalid(ValidationErrors),
    /// Another submission for this mount is still in flight.
    Busy,
    /// No band is loaded (still loading, not found, or unmounted).
    Unavailable,
    Updated,
    Failed(SubmitError),
    /// The mount moved to another band or was torn down while the request
    /// was in flight; the result was dropped.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub navigation_delay: Duration,
    /// Pins the upper bound for `formed_year`; the local calendar year is
    /// used when unset.
    pub current_year: Option<i32>,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            navigation_delay: NAVIGATION_DELAY,
            current_year: None,
        }
    }
}

struct WorkflowState {
    mounted: bool,
    phase: WorkflowPhase,
    ticket: Option<FetchTicket>,
    band_name: String,
    values: BandFormValues,
    errors: ValidationErrors,
    status: Option<StatusBanner>,
}

impl WorkflowState {
    fn unmounted() -> Self {
        Self {
            mounted: false,
            phase: WorkflowPhase::Loading,
            ticket: None,
            band_name: String::new(),
            values: BandFormValues::default(),
            errors: ValidationErrors::default(),
            status: None,
        }
    }

    fn reset_for(&mut self, ticket: FetchTicket) {
        self.mounted = true;
        self.phase = WorkflowPhase::Loading;
        self.ticket = Some(ticket);
        self.band_name.clear();
        self.values = BandFormValues::default();
        self.errors = ValidationErrors::default();
        self.status = None;
    }

    fn apply_band(&mut self, band: &Band) {
        self.phase = WorkflowPhase::Ready;
        self.band_name = band.name.clone();
        self.values = BandFormValues::from_band(band);
    }

    fn has_form(&self) -> bool {
        matches!(
            self.phase,
            WorkflowPhase::Ready | WorkflowPhase::Submitting | WorkflowPhase::Success
        )
    }

    fn view(&self) -> EditViewState {
        let Some(ticket) = &self.ticket else {
            return EditViewState::Loading;
        };
        let submitting = self.phase == WorkflowPhase::Submitting;
        let form = || EditForm {
            band_id: ticket.band_id().clone(),
            heading: format!("Update {}'s information", self.band_name),
            back_link: Route::BandDetail(ticket.band_id().clone()),
            values: self.values.clone(),
            errors: self.errors.clone(),
            status: self.status.clone(),
            submit_enabled: !submitting,
            submit_label: if submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
        };

        match self.phase {
            WorkflowPhase::Loading => EditViewState::Loading,
            WorkflowPhase::NotFound => EditViewState::NotFound,
            WorkflowPhase::Ready => EditViewState::Ready(form()),
            WorkflowPhase::Submitting => EditViewState::Submitting(form()),
            WorkflowPhase::Success => EditViewState::Success(form()),
        }
    }
}

/// Edit flow for a single band: load, edit, validate, submit, then move to
/// the detail view once the success banner has been shown.
pub struct EditWorkflow {
    fetcher: BandFetcher,
    updater: Arc<dyn BandUpdater>,
    navigator: Arc<dyn Navigator>,
    options: WorkflowOptions,
    requests: RequestTracker,
    state: Mutex<WorkflowState>,
    pending_navigation: Mutex<Option<PendingNavigation>>,
    view: watch::Sender<EditViewState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EditWorkflow {
    pub fn new(
        source: Arc<dyn BandSource>,
        updater: Arc<dyn BandUpdater>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        Self::with_options(source, updater, navigator, WorkflowOptions::default())
    }

    pub fn with_options(
        source: Arc<dyn BandSource>,
        updater: Arc<dyn BandUpdater>,
        navigator: Arc<dyn Navigator>,
        options: WorkflowOptions,
    ) -> Arc<Self> {
        let (view, _) = watch::channel(EditViewState::Loading);
        Arc::new(Self {
            fetcher: BandFetcher::new(source),
            updater,
            navigator,
            options,
            requests: RequestTracker::default(),
            state: Mutex::new(WorkflowState::unmounted()),
            pending_navigation: Mutex::new(None),
            view,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<EditViewState> {
        self.view.subscribe()
    }

    pub fn view_state(&self) -> EditViewState {
        self.view.borrow().clone()
    }

    pub fn phase(&self) -> WorkflowPhase {
        lock(&self.state).phase
    }

    pub fn band_id(&self) -> Option<BandId> {
        lock(&self.state)
            .ticket
            .as_ref()
            .map(|ticket| ticket.band_id().clone())
    }

    pub fn has_pending_navigation(&self) -> bool {
        lock(&self.pending_navigation)
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    /// Loads `band_id` and resets the form to its stored values.
    pub async fn mount(&self, band_id: BandId) {
        self.load(band_id).await;
    }

    /// Re-runs the load when the identifier differs from the mounted one,
    /// discarding unsaved edits. Same identifier is a no-op.
    pub async fn set_band_id(&self, band_id: BandId) {
        {
            let state = lock(&self.state);
            let unchanged = state.mounted
                && state
                    .ticket
                    .as_ref()
                    .is_some_and(|ticket| *ticket.band_id() == band_id);
            if unchanged {
                return;
            }
        }
        self.load(band_id).await;
    }

    /// Tears the mount down: pending navigation is cancelled and in-flight
    /// results are ignored.
    pub fn unmount(&self) {
        let mut state = lock(&self.state);
        state.mounted = false;
        self.requests.cancel();
        self.cancel_navigation();
        debug!("edit workflow unmounted");
    }

    /// Updates one field's text. Returns false when no form is shown.
    pub fn edit(&self, field: Field, value: impl Into<String>) -> bool {
        let mut state = lock(&self.state);
        if !state.has_form() {
            return false;
        }
        state.values.set(field, value);
        state.errors.remove(field);
        self.publish(&state);
        true
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (ticket, request) = {
            let mut state = lock(&self.state);
            if !state.mounted {
                return SubmitOutcome::Unavailable;
            }
            match state.phase {
                WorkflowPhase::Loading | WorkflowPhase::NotFound => {
                    return SubmitOutcome::Unavailable;
                }
                WorkflowPhase::Submitting => return SubmitOutcome::Busy,
                WorkflowPhase::Ready | WorkflowPhase::Success => {}
            }
            let Some(ticket) = state.ticket.clone() else {
                return SubmitOutcome::Unavailable;
            };

            let year = self.options.current_year.unwrap_or_else(current_year);
            let request = match ValidationSchema::band(year).check(&state.values) {
                Ok(request) => request,
                Err(errors) => {
                    debug!(band_id = %ticket.band_id(), invalid_fields = errors.len(), "band form rejected locally");
                    state.errors = errors.clone();
                    self.publish(&state);
                    return SubmitOutcome::Invalid(errors);
                }
            };

            self.cancel_navigation();
            state.phase = WorkflowPhase::Submitting;
            state.errors = ValidationErrors::default();
            state.status = None;
            self.publish(&state);
            (ticket, request)
        };

        info!(band_id = %ticket.band_id(), "submitting band update");
        let result = self.updater.update_band(ticket.band_id(), &request).await;

        let mut state = lock(&self.state);
        if !state.mounted || !self.requests.is_current(&ticket) {
            debug!(band_id = %ticket.band_id(), "dropping update result for superseded mount");
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                state.phase = WorkflowPhase::Success;
                state.status = Some(StatusBanner::Success(format!(
                    "Band \"{}\" updated successfully!",
                    request.name
                )));
                self.publish(&state);
                self.schedule_navigation(Route::BandDetail(ticket.band_id().clone()));
                SubmitOutcome::Updated
            }
            Err(err) => {
                warn!(band_id = %ticket.band_id(), error = %err, "band update failed");
                state.phase = WorkflowPhase::Ready;
                state.status = Some(StatusBanner::Error(err.banner_message()));
                self.publish(&state);
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn load(&self, band_id: BandId) {
        let ticket = {
            let mut state = lock(&self.state);
            self.cancel_navigation();
            let ticket = self.requests.begin(band_id.clone());
            state.reset_for(ticket.clone());
            self.publish(&state);
            ticket
        };

        let result = self.fetcher.fetch(&band_id).await;

        let mut state = lock(&self.state);
        if !self.requests.is_current(&ticket) {
            debug!(band_id = %band_id, "discarding stale band fetch");
            return;
        }
        match result {
            Ok(band) => state.apply_band(&band),
            Err(_) => state.phase = WorkflowPhase::NotFound,
        }
        self.publish(&state);
    }

    fn publish(&self, state: &WorkflowState) {
        self.view.send_replace(state.view());
    }

    fn schedule_navigation(&self, route: Route) {
        let navigator = Arc::clone(&self.navigator);
        let delay = self.options.navigation_delay;
        let gate = NavigationGate::armed();
        let task_gate = gate.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task_gate.pass(navigator.as_ref(), route);
        });
        let pending = PendingNavigation { gate, handle };
        if let Some(previous) = lock(&self.pending_navigation).replace(pending) {
            previous.cancel();
        }
    }

    fn cancel_navigation(&self) {
        if let Some(pending) = lock(&self.pending_navigation).take() {
            if !pending.handle.is_finished() {
                debug!("cancelling pending navigation");
            }
            pending.cancel();
        }
    }
}

/// Shared between the workflow and its navigation task. `abort` cannot stop a
/// task that is already being polled, so the task navigates only while the
/// gate is armed, and disarming waits for any navigation in progress.
#[derive(Clone)]
struct NavigationGate(Arc<Mutex<bool>>);

impl NavigationGate {
    fn armed() -> Self {
        Self(Arc::new(Mutex::new(true)))
    }

    fn disarm(&self) {
        *lock(&self.0) = false;
    }

    fn pass(&self, navigator: &dyn Navigator, route: Route) -> bool {
        let armed = lock(&self.0);
        if *armed {
            navigator.navigate(route);
        }
        *armed
    }
}

struct PendingNavigation {
    gate: NavigationGate,
    handle: JoinHandle<()>,
}

impl PendingNavigation {
    fn cancel(self) {
        self.gate.disarm();
        self.handle.abort();
    }
}

impl Drop for EditWorkflow {
    fn drop(&mut self) {
        self.cancel_navigation();
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
