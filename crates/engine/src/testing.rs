//! Scripted in-memory backend used by the engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use automator_api::{ApiError, WorkflowApi};
use automator_types::{
    ExecutionSummary, ExtractedRecord, ItemsEnvelope, RunStatus, Step, SubmitResponse, WorkflowRun, WorkflowSummary,
};
use indexmap::IndexMap;

pub(crate) fn run_with_status(status: RunStatus, progress: u8) -> WorkflowRun {
    WorkflowRun {
        status,
        progress,
        ..WorkflowRun::default()
    }
}

pub(crate) fn step(name: &str, status: RunStatus) -> Step {
    Step {
        step: name.to_string(),
        status,
        details: None,
    }
}

pub(crate) fn accepted(workflow_id: &str) -> SubmitResponse {
    SubmitResponse {
        workflow_id: workflow_id.to_string(),
        status: Some(RunStatus::Pending),
        steps: Vec::new(),
    }
}

/// Decrements the in-flight counter even when the request future is dropped.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Backend fake answering from per-endpoint queues.
///
/// Once a status queue is exhausted every further poll reports `running` at
/// 0%, so a session keeps polling until cancelled. Empty list queues answer
/// with `{items: []}`.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    submits: Mutex<VecDeque<Result<SubmitResponse, ApiError>>>,
    statuses: Mutex<VecDeque<Result<WorkflowRun, ApiError>>>,
    workflows: Mutex<VecDeque<Result<ItemsEnvelope<WorkflowSummary>, ApiError>>>,
    executions: Mutex<VecDeque<Result<ItemsEnvelope<ExecutionSummary>, ApiError>>>,
    extracted: Mutex<VecDeque<Result<ItemsEnvelope<ExtractedRecord>, ApiError>>>,
    status_calls: Mutex<HashMap<String, usize>>,
    list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    status_delay: Duration,
    list_delay: Duration,
    healthy: bool,
}

impl ScriptedApi {
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub fn push_submit(&self, result: Result<SubmitResponse, ApiError>) {
        self.submits.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, result: Result<WorkflowRun, ApiError>) {
        self.statuses.lock().unwrap().push_back(result);
    }

    pub fn push_workflows(&self, result: Result<ItemsEnvelope<WorkflowSummary>, ApiError>) {
        self.workflows.lock().unwrap().push_back(result);
    }

    pub fn push_extracted(&self, result: Result<ItemsEnvelope<ExtractedRecord>, ApiError>) {
        self.extracted.lock().unwrap().push_back(result);
    }

    pub fn status_calls(&self, workflow_id: &str) -> usize {
        self.status_calls.lock().unwrap().get(workflow_id).copied().unwrap_or(0)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn list_round_trip(&self) {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
    }
}

#[async_trait]
impl WorkflowApi for ScriptedApi {
    async fn submit_workflow(
        &self,
        _description: &str,
        _parameters: &IndexMap<String, String>,
    ) -> Result<SubmitResponse, ApiError> {
        let next = self.submits.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(accepted("wf-default")))
    }

    async fn fetch_status(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError> {
        *self.status_calls.lock().unwrap().entry(workflow_id.to_string()).or_default() += 1;
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(run_with_status(RunStatus::Running, 0)))
            .map(|mut run| {
                run.workflow_id = workflow_id.to_string();
                run
            })
    }

    async fn check_health(&self) -> bool {
        self.healthy
    }

    async fn list_workflows(&self) -> Result<ItemsEnvelope<WorkflowSummary>, ApiError> {
        self.list_round_trip().await;
        let next = self.workflows.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(ItemsEnvelope::default()))
    }

    async fn list_executions(&self) -> Result<ItemsEnvelope<ExecutionSummary>, ApiError> {
        self.list_round_trip().await;
        let next = self.executions.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(ItemsEnvelope::default()))
    }

    async fn get_execution(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError> {
        self.list_round_trip().await;
        let mut run = run_with_status(RunStatus::Completed, 100);
        run.workflow_id = workflow_id.to_string();
        Ok(run)
    }

    async fn list_extracted(&self) -> Result<ItemsEnvelope<ExtractedRecord>, ApiError> {
        self.list_round_trip().await;
        let next = self.extracted.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(ItemsEnvelope::default()))
    }

    async fn reset(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
