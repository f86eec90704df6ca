//! In-memory backend for App and render tests.

use async_trait::async_trait;
use automator_api::{ApiError, Endpoint, WorkflowApi};
use automator_types::{
    ExecutionSummary, ExtractedRecord, ItemsEnvelope, RunStatus, SubmitResponse, WorkflowRun, WorkflowSummary,
};
use indexmap::IndexMap;

/// Answers every list with fixed rows. Status polls report `running`.
#[derive(Default)]
pub(crate) struct StubApi {
    pub workflows: Vec<WorkflowSummary>,
    pub executions: Vec<ExecutionSummary>,
    pub extracted: Vec<ExtractedRecord>,
    /// When set, every list request fails with this HTTP status.
    pub list_failure: Option<u16>,
}

impl StubApi {
    pub fn with_executions(ids: &[&str]) -> Self {
        let executions = ids
            .iter()
            .map(|id| ExecutionSummary {
                workflow_id: id.to_string(),
                status: RunStatus::Completed,
                progress: 100,
                last_step: None,
                steps_completed: 1,
            })
            .collect();
        Self {
            executions,
            ..Self::default()
        }
    }

    fn list<T: Clone>(&self, endpoint: Endpoint, items: &[T]) -> Result<ItemsEnvelope<T>, ApiError> {
        match self.list_failure {
            Some(status) => Err(ApiError::Http { endpoint, status }),
            None => Ok(ItemsEnvelope { items: items.to_vec() }),
        }
    }
}

#[async_trait]
impl WorkflowApi for StubApi {
    async fn submit_workflow(&self, _: &str, _: &IndexMap<String, String>) -> Result<SubmitResponse, ApiError> {
        Ok(SubmitResponse {
            workflow_id: "wf-new".into(),
            status: Some(RunStatus::Pending),
            steps: Vec::new(),
        })
    }

    async fn fetch_status(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError> {
        Ok(WorkflowRun {
            workflow_id: workflow_id.into(),
            status: RunStatus::Running,
            ..WorkflowRun::default()
        })
    }

    async fn check_health(&self) -> bool {
        true
    }

    async fn list_workflows(&self) -> Result<ItemsEnvelope<WorkflowSummary>, ApiError> {
        self.list(Endpoint::ListWorkflows, &self.workflows)
    }

    async fn list_executions(&self) -> Result<ItemsEnvelope<ExecutionSummary>, ApiError> {
        self.list(Endpoint::ListExecutions, &self.executions)
    }

    async fn get_execution(&self, workflow_id: &str) -> Result<WorkflowRun, ApiError> {
        Ok(WorkflowRun {
            workflow_id: workflow_id.into(),
            status: RunStatus::Completed,
            progress: 100,
            result: Some("done".into()),
            ..WorkflowRun::default()
        })
    }

    async fn list_extracted(&self) -> Result<ItemsEnvelope<ExtractedRecord>, ApiError> {
        self.list(Endpoint::ListExtracted, &self.extracted)
    }

    async fn reset(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Flatten a test terminal's buffer into one string per row.
pub(crate) fn buffer_lines(buffer: &ratatui::buffer::Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| (area.left()..area.right()).map(|x| buffer[(x, y)].symbol()).collect::<String>())
        .collect()
}
