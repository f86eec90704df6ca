//! Per-page load state for the list and detail pages.
//!
//! Each visit to a page runs exactly one fetch. The result is tagged with
//! the page's generation at activation time; leaving the page bumps the
//! generation and cancels the request, so a late response can never land on
//! a page the user has already left.

use std::sync::Arc;

use automator_api::WorkflowApi;
use automator_types::{ExecutionSummary, ExtractedRecord, Page, WorkflowRun, WorkflowSummary};
use automator_util::redact_sensitive;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Load state of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    /// The page has not been shown yet.
    #[default]
    NotLoaded,
    Loading,
    Ready(T),
    /// Display string of the failed request.
    Error(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Data delivered by a page fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload {
    Workflows(Vec<WorkflowSummary>),
    Executions(Vec<ExecutionSummary>),
    Extracted(Vec<ExtractedRecord>),
    Execution(WorkflowRun),
}

/// Completion of one page fetch.
#[derive(Debug)]
pub struct ListEvent {
    pub page: Page,
    pub generation: u64,
    pub outcome: Result<ListPayload, String>,
}

pub type ListEventReceiver = UnboundedReceiver<ListEvent>;

#[derive(Debug)]
struct PageSlot<T> {
    state: LoadState<T>,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl<T> Default for PageSlot<T> {
    fn default() -> Self {
        Self {
            state: LoadState::NotLoaded,
            generation: 0,
            cancel: None,
        }
    }
}

impl<T> PageSlot<T> {
    fn begin(&mut self) -> (u64, CancellationToken) {
        self.stop();
        self.generation += 1;
        self.state = LoadState::Loading;
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        (self.generation, token)
    }

    fn stop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }

    fn leave(&mut self) {
        self.stop();
        self.generation += 1;
        if self.state.is_loading() {
            self.state = LoadState::NotLoaded;
        }
    }

    fn settle(&mut self, generation: u64, state: LoadState<T>) -> bool {
        if generation != self.generation || !self.state.is_loading() {
            return false;
        }
        self.cancel = None;
        self.state = state;
        true
    }
}

/// Owns the load state of every fetched page.
pub struct ViewStateStore {
    api: Arc<dyn WorkflowApi>,
    event_tx: UnboundedSender<ListEvent>,
    workflows: PageSlot<Vec<WorkflowSummary>>,
    executions: PageSlot<Vec<ExecutionSummary>>,
    extracted: PageSlot<Vec<ExtractedRecord>>,
    execution: PageSlot<WorkflowRun>,
    execution_id: Option<String>,
}

impl ViewStateStore {
    pub fn new(api: Arc<dyn WorkflowApi>) -> (Self, ListEventReceiver) {
        let (event_tx, event_rx) = unbounded_channel();
        let store = Self {
            api,
            event_tx,
            workflows: PageSlot::default(),
            executions: PageSlot::default(),
            extracted: PageSlot::default(),
            execution: PageSlot::default(),
            execution_id: None,
        };
        (store, event_rx)
    }

    /// Enter `page`: mark it loading and spawn its single fetch.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn activate(&mut self, page: Page) {
        let (generation, cancel) = match &page {
            Page::Workflows => self.workflows.begin(),
            Page::Executions => self.executions.begin(),
            Page::Extracted => self.extracted.begin(),
            Page::ExecutionDetail(workflow_id) => {
                self.execution_id = Some(workflow_id.clone());
                self.execution.begin()
            }
        };
        debug!(page = page.title(), generation, "page activated");

        let api = Arc::clone(&self.api);
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                outcome = fetch_page(api.as_ref(), &page) => outcome,
            };
            if let Err(error) = &outcome {
                warn!(page = page.title(), error = %redact_sensitive(error), "page fetch failed");
            }
            let _ = event_tx.send(ListEvent {
                page,
                generation,
                outcome,
            });
        });
    }

    /// Leave `page`; an in-flight fetch is cancelled and its result ignored.
    pub fn deactivate(&mut self, page: &Page) {
        match page {
            Page::Workflows => self.workflows.leave(),
            Page::Executions => self.executions.leave(),
            Page::Extracted => self.extracted.leave(),
            Page::ExecutionDetail(workflow_id) => {
                if self.execution_id.as_deref() == Some(workflow_id.as_str()) {
                    self.execution.leave();
                }
            }
        }
        debug!(page = page.title(), "page deactivated");
    }

    /// Apply a fetch result. Returns `true` when the page state changed.
    pub fn apply(&mut self, event: ListEvent) -> bool {
        let ListEvent {
            page,
            generation,
            outcome,
        } = event;

        let changed = match &page {
            Page::Workflows => load_state(outcome, |payload| match payload {
                ListPayload::Workflows(items) => Some(items),
                _ => None,
            })
            .is_some_and(|state| self.workflows.settle(generation, state)),
            Page::Executions => load_state(outcome, |payload| match payload {
                ListPayload::Executions(items) => Some(items),
                _ => None,
            })
            .is_some_and(|state| self.executions.settle(generation, state)),
            Page::Extracted => load_state(outcome, |payload| match payload {
                ListPayload::Extracted(items) => Some(items),
                _ => None,
            })
            .is_some_and(|state| self.extracted.settle(generation, state)),
            Page::ExecutionDetail(workflow_id) => {
                self.execution_id.as_deref() == Some(workflow_id.as_str())
                    && load_state(outcome, |payload| match payload {
                        ListPayload::Execution(run) => Some(run),
                        _ => None,
                    })
                    .is_some_and(|state| self.execution.settle(generation, state))
            }
        };

        if !changed {
            debug!(page = page.title(), generation, "ignoring stale page result");
        }
        changed
    }

    pub fn workflows(&self) -> &LoadState<Vec<WorkflowSummary>> {
        &self.workflows.state
    }

    pub fn executions(&self) -> &LoadState<Vec<ExecutionSummary>> {
        &self.executions.state
    }

    pub fn extracted(&self) -> &LoadState<Vec<ExtractedRecord>> {
        &self.extracted.state
    }

    /// Detail state for `workflow_id`; `NotLoaded` when another id was shown last.
    pub fn execution(&self, workflow_id: &str) -> &LoadState<WorkflowRun> {
        const NOT_LOADED: &LoadState<WorkflowRun> = &LoadState::NotLoaded;
        if self.execution_id.as_deref() == Some(workflow_id) {
            &self.execution.state
        } else {
            NOT_LOADED
        }
    }
}

impl Drop for ViewStateStore {
    fn drop(&mut self) {
        self.workflows.stop();
        self.executions.stop();
        self.extracted.stop();
        self.execution.stop();
    }
}

/// `None` when the payload belongs to a different page.
fn load_state<T>(outcome: Result<ListPayload, String>, extract: impl FnOnce(ListPayload) -> Option<T>) -> Option<LoadState<T>> {
    match outcome {
        Ok(payload) => extract(payload).map(LoadState::Ready),
        Err(message) => Some(LoadState::Error(message)),
    }
}

async fn fetch_page(api: &dyn WorkflowApi, page: &Page) -> Result<ListPayload, String> {
    let result = match page {
        Page::Workflows => api.list_workflows().await.map(|envelope| ListPayload::Workflows(envelope.items)),
        Page::Executions => api.list_executions().await.map(|envelope| ListPayload::Executions(envelope.items)),
        Page::Extracted => api.list_extracted().await.map(|envelope| ListPayload::Extracted(envelope.items)),
        Page::ExecutionDetail(workflow_id) => api.get_execution(workflow_id).await.map(ListPayload::Execution),
    };
    result.map_err(|error| error.to_string())
}
