//! Owner of the dashboard's single in-flight workflow run.
//!
//! States: `Idle → Submitting → Polling → {Completed, Failed}`. The
//! controller is the only writer of the current-run slot; renderers read it
//! through accessors. At most one polling session (one timer task) exists per
//! controller, and starting a new run stops the previous session before the
//! new one is spawned.

use std::sync::Arc;
use std::time::Duration;

use automator_api::{ApiError, WorkflowApi};
use automator_types::{RunStatus, Step, WorkflowRun};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::poller::{PollEvent, PollEventReceiver, SessionId, SessionRequest, run_session};

/// Default status poll period.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(1);

/// Lifecycle of the current run as seen by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl PollPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// `true` while a session is submitting or polling.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Submitting | Self::Polling)
    }
}

/// Failures the controller turns into the dashboard's error line.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Submit(ApiError),

    #[error("status polling for {workflow_id} stopped: {source}")]
    Aborted {
        workflow_id: String,
        #[source]
        source: ApiError,
    },
}

struct ActiveSession {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveSession {
    /// Cancel cooperatively, then abort so the task cannot outlive this call.
    fn stop(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// Submits runs and tracks the latest status snapshot of the current one.
///
/// Events produced by the background session arrive on the
/// [`PollEventReceiver`] returned from [`PollingController::new`]; the owning
/// event loop passes each one to [`PollingController::apply`].
pub struct PollingController {
    api: Arc<dyn WorkflowApi>,
    period: Duration,
    event_tx: UnboundedSender<PollEvent>,
    phase: PollPhase,
    session: SessionId,
    last_seq: u64,
    active: Option<ActiveSession>,
    workflow_id: Option<String>,
    planned_steps: Vec<Step>,
    run: Option<WorkflowRun>,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
}

impl PollingController {
    pub fn new(api: Arc<dyn WorkflowApi>, period: Duration) -> (Self, PollEventReceiver) {
        let (event_tx, event_rx) = unbounded_channel();
        let controller = Self {
            api,
            period,
            event_tx,
            phase: PollPhase::Idle,
            session: 0,
            last_seq: 0,
            active: None,
            workflow_id: None,
            planned_steps: Vec::new(),
            run: None,
            error: None,
            last_updated: None,
        };
        (controller, event_rx)
    }

    /// Start a fresh run, discarding the previous run and its timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self, description: impl Into<String>, parameters: IndexMap<String, String>) {
        self.stop_session();

        self.session += 1;
        self.last_seq = 0;
        self.phase = PollPhase::Submitting;
        self.workflow_id = None;
        self.planned_steps.clear();
        self.run = None;
        self.error = None;
        self.last_updated = None;

        let cancel = CancellationToken::new();
        let request = SessionRequest {
            session: self.session,
            description: description.into(),
            parameters,
            period: self.period,
        };
        let handle = tokio::spawn(run_session(
            Arc::clone(&self.api),
            request,
            cancel.clone(),
            self.event_tx.clone(),
        ));
        self.active = Some(ActiveSession { cancel, handle });
        info!(session = self.session, "workflow run started");
    }

    /// Stop the active session. A non-terminal run is discarded and the
    /// controller returns to `Idle`; a settled run stays on display.
    pub fn cancel(&mut self) {
        self.stop_session();
        if !self.phase.is_terminal() {
            self.phase = PollPhase::Idle;
            self.workflow_id = None;
            self.planned_steps.clear();
            self.run = None;
            self.last_updated = None;
        }
    }

    /// Apply one event from the session. Returns `true` when visible state changed.
    ///
    /// Events from superseded sessions, snapshots older than the last applied
    /// one, and snapshots identical to the current one change nothing.
    pub fn apply(&mut self, event: PollEvent) -> bool {
        if event.session() != self.session {
            trace!(event_session = event.session(), session = self.session, "dropping event from stale session");
            return false;
        }

        match event {
            PollEvent::Submitted { response, .. } => {
                if self.phase != PollPhase::Submitting {
                    return false;
                }
                self.phase = PollPhase::Polling;
                self.workflow_id = Some(response.workflow_id);
                self.planned_steps = response.steps;
                true
            }
            PollEvent::SubmitFailed { error, .. } => {
                if self.phase != PollPhase::Submitting {
                    return false;
                }
                self.phase = PollPhase::Failed;
                self.error = Some(PollError::Submit(error).to_string());
                self.stop_session();
                true
            }
            PollEvent::Snapshot { seq, run, .. } => {
                if self.phase != PollPhase::Polling || seq <= self.last_seq {
                    debug!(seq, last_seq = self.last_seq, "dropping out-of-order snapshot");
                    return false;
                }
                self.last_seq = seq;

                let status = run.status;
                let changed = self.run.as_ref() != Some(&run);
                if changed {
                    self.run = Some(run);
                    self.last_updated = Some(Utc::now());
                }

                match status {
                    RunStatus::Completed => self.settle(PollPhase::Completed),
                    RunStatus::Failed => self.settle(PollPhase::Failed),
                    RunStatus::Pending | RunStatus::Running => changed,
                }
            }
            PollEvent::Aborted { workflow_id, error, .. } => {
                if self.phase != PollPhase::Polling {
                    return false;
                }
                self.error = Some(PollError::Aborted { workflow_id, source: error }.to_string());
                self.settle(PollPhase::Failed)
            }
        }
    }

    fn settle(&mut self, phase: PollPhase) -> bool {
        self.phase = phase;
        self.stop_session();
        info!(session = self.session, phase = ?phase, "run settled");
        true
    }

    fn stop_session(&mut self) {
        if let Some(active) = self.active.take() {
            active.stop();
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// `true` while submitting or polling; the dashboard disables Run meanwhile.
    pub fn is_running(&self) -> bool {
        self.phase.is_active()
    }

    /// Whether a session task (and therefore a poll timer) currently exists.
    pub fn has_active_session(&self) -> bool {
        self.active.is_some()
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn workflow_id(&self) -> Option<&str> {
        self.workflow_id.as_deref()
    }

    /// Steps the backend announced at submission, before any snapshot arrived.
    pub fn planned_steps(&self) -> &[Step] {
        &self.planned_steps
    }

    /// Last-known snapshot of the current run.
    pub fn run(&self) -> Option<&WorkflowRun> {
        self.run.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Wall-clock time the current snapshot was applied.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.stop_session();
    }
}
