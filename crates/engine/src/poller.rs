//! Cancellable status-polling task.
//!
//! A session is one submitted run: the task submits the workflow, then polls
//! its status on a fixed period until a terminal snapshot, a failed request,
//! or cancellation. Results flow back to the owner as [`PollEvent`]s over an
//! unbounded Tokio channel; the task never touches controller state itself.
//!
//! Each status request is awaited before the next tick is taken, so a session
//! never has more than one request in flight. Snapshots are additionally
//! tagged with a per-session sequence number so the receiver can discard
//! anything older than what it already applied.

use std::sync::Arc;
use std::time::Duration;

use automator_api::{ApiError, WorkflowApi};
use automator_types::{RunStatus, SubmitResponse, WorkflowRun};
use indexmap::IndexMap;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Identifies one submit-and-poll session of a controller.
pub type SessionId = u64;

/// Receiving half handed to the event loop that owns the controller.
pub type PollEventReceiver = UnboundedReceiver<PollEvent>;

/// Progress reported by a polling session.
#[derive(Debug)]
pub enum PollEvent {
    /// The backend accepted the submission.
    Submitted { session: SessionId, response: SubmitResponse },
    /// The submission request failed; no polling follows.
    SubmitFailed { session: SessionId, error: ApiError },
    /// A status response arrived.
    Snapshot { session: SessionId, seq: u64, run: WorkflowRun },
    /// A status request failed; the session has stopped.
    Aborted {
        session: SessionId,
        workflow_id: String,
        error: ApiError,
    },
}

impl PollEvent {
    pub fn session(&self) -> SessionId {
        match self {
            Self::Submitted { session, .. }
            | Self::SubmitFailed { session, .. }
            | Self::Snapshot { session, .. }
            | Self::Aborted { session, .. } => *session,
        }
    }
}

/// How a polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A terminal snapshot was observed.
    Finished(RunStatus),
    /// A status request failed.
    Aborted,
    /// The cancellation token fired.
    Cancelled,
    /// Nobody is listening any more.
    ReceiverClosed,
}

/// Inputs for one submit-and-poll session.
pub(crate) struct SessionRequest {
    pub session: SessionId,
    pub description: String,
    pub parameters: IndexMap<String, String>,
    pub period: Duration,
}

/// Submit a workflow, then poll it to completion.
pub(crate) async fn run_session(
    api: Arc<dyn WorkflowApi>,
    request: SessionRequest,
    cancel: CancellationToken,
    event_tx: UnboundedSender<PollEvent>,
) {
    let SessionRequest {
        session,
        description,
        parameters,
        period,
    } = request;

    let submitted = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(session, "session cancelled during submission");
            return;
        }
        result = api.submit_workflow(&description, &parameters) => result,
    };

    let response = match submitted {
        Ok(response) => response,
        Err(error) => {
            warn!(session, error = %error.redacted(), "workflow submission failed");
            let _ = event_tx.send(PollEvent::SubmitFailed { session, error });
            return;
        }
    };

    let workflow_id = response.workflow_id.clone();
    info!(session, workflow_id = %workflow_id, "workflow accepted");
    if event_tx.send(PollEvent::Submitted { session, response }).is_err() {
        return;
    }

    let outcome = drive_status_polling(api, session, workflow_id.clone(), period, cancel, event_tx).await;
    debug!(session, workflow_id = %workflow_id, ?outcome, "polling finished");
}

/// Poll `workflow_id` every `period` until the run settles.
///
/// The first request goes out one period after the call. Ticks missed while a
/// request is outstanding are delayed rather than bunched up.
pub async fn drive_status_polling(
    api: Arc<dyn WorkflowApi>,
    session: SessionId,
    workflow_id: String,
    period: Duration,
    cancel: CancellationToken,
    event_tx: UnboundedSender<PollEvent>,
) -> PollOutcome {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        seq += 1;
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = api.fetch_status(&workflow_id) => result,
        };

        match fetched {
            Ok(run) => {
                let status = run.status;
                debug!(session, seq, workflow_id = %workflow_id, %status, progress = run.progress, "status snapshot");
                if event_tx.send(PollEvent::Snapshot { session, seq, run }).is_err() {
                    return PollOutcome::ReceiverClosed;
                }
                if status.is_terminal() {
                    info!(session, workflow_id = %workflow_id, %status, "run reached terminal state");
                    return PollOutcome::Finished(status);
                }
            }
            Err(error) => {
                warn!(session, seq, workflow_id = %workflow_id, error = %error.redacted(), "status poll failed; stopping");
                let _ = event_tx.send(PollEvent::Aborted {
                    session,
                    workflow_id,
                    error,
                });
                return PollOutcome::Aborted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedApi, run_with_status};
    use automator_api::Endpoint;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test(start_paused = true)]
    async fn stops_after_terminal_snapshot() {
        let api = Arc::new(ScriptedApi::default());
        api.push_status(Ok(run_with_status(RunStatus::Running, 50)));
        api.push_status(Ok(run_with_status(RunStatus::Completed, 100)));
        let (event_tx, mut event_rx) = unbounded_channel();

        let outcome = drive_status_polling(
            api.clone(),
            7,
            "wf-1".into(),
            Duration::from_secs(1),
            CancellationToken::new(),
            event_tx,
        )
        .await;

        assert_eq!(outcome, PollOutcome::Finished(RunStatus::Completed));
        assert_eq!(api.status_calls("wf-1"), 2);
        let mut seqs = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            if let PollEvent::Snapshot { session, seq, .. } = event {
                assert_eq!(session, 7);
                seqs.push(seq);
            }
        }
        assert_eq!(seqs, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_waits_one_period() {
        let api = Arc::new(ScriptedApi::default());
        api.push_status(Ok(run_with_status(RunStatus::Completed, 100)));
        let (event_tx, _event_rx) = unbounded_channel();

        let started = Instant::now();
        drive_status_polling(api, 1, "wf".into(), Duration::from_secs(1), CancellationToken::new(), event_tx).await;
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_request_aborts_with_error_event() {
        let api = Arc::new(ScriptedApi::default());
        api.push_status(Err(ApiError::Http {
            endpoint: Endpoint::Status,
            status: 502,
        }));
        let (event_tx, mut event_rx) = unbounded_channel();

        let outcome =
            drive_status_polling(api.clone(), 1, "wf-1".into(), Duration::from_secs(1), CancellationToken::new(), event_tx).await;

        assert_eq!(outcome, PollOutcome::Aborted);
        match event_rx.try_recv().expect("abort event") {
            PollEvent::Aborted { workflow_id, error, .. } => {
                assert_eq!(workflow_id, "wf-1");
                assert_eq!(error.status(), Some(502));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_responses_never_overlap() {
        let api = Arc::new(ScriptedApi::default().with_status_delay(Duration::from_millis(2500)));
        let (event_tx, _event_rx) = unbounded_channel();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(drive_status_polling(
            api.clone(),
            1,
            "wf-slow".into(),
            Duration::from_secs(1),
            cancel.clone(),
            event_tx,
        ));
        time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();
        assert_eq!(task.await.expect("join"), PollOutcome::Cancelled);

        assert!(api.status_calls("wf-slow") >= 3);
        assert_eq!(api.max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_outstanding_request() {
        let api = Arc::new(ScriptedApi::default().with_status_delay(Duration::from_secs(30)));
        let (event_tx, mut event_rx) = unbounded_channel();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(drive_status_polling(
            api.clone(),
            1,
            "wf".into(),
            Duration::from_secs(1),
            cancel.clone(),
            event_tx,
        ));
        time::sleep(Duration::from_secs(2)).await;
        cancel.cancel();

        assert_eq!(task.await.expect("join"), PollOutcome::Cancelled);
        assert!(event_rx.try_recv().is_err());
    }
}
