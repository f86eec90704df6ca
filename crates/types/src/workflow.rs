//! Wire models for the workflow automation backend.
//!
//! Every type here is a read-only projection of state owned by the backend.
//! The client decodes, holds, and renders them, but never mutates a received
//! snapshot in place; a newer snapshot always replaces the older one whole.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Lifecycle status of a workflow run or one of its steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Accepted but not yet executing. The submit endpoint reports this as `started`.
    #[default]
    #[serde(alias = "started")]
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// Returns `true` when no further transitions can occur for the run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Lowercase label matching the wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reference to the step the backend is (or was last) working on.
///
/// The backend forwards its parsed step definition verbatim, so only the
/// common keys are typed; anything else is preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReference {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub save_as: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, JsonValue>,
}

impl StepReference {
    /// Action label when one was reported and is not blank.
    pub fn action_label(&self) -> Option<&str> {
        self.action.as_deref().map(str::trim).filter(|action| !action.is_empty())
    }
}

/// One reported step of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Name or action label, e.g. `login`.
    pub step: String,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub details: Option<String>,
}

impl Step {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Last-known snapshot of a workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Opaque identifier. The status endpoint does not echo it, so clients fill it in.
    #[serde(default)]
    pub workflow_id: String,
    #[serde(default)]
    pub status: RunStatus,
    /// Completion percentage, clamped to `0..=100` on decode.
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub current_step: Option<StepReference>,
    /// Steps in the order the backend reported them.
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub vision_enabled: bool,
    /// Free-text outcome the backend attaches once the run has finished.
    #[serde(default)]
    pub result: Option<String>,
}

impl WorkflowRun {
    /// Number of steps reported as completed.
    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|step| step.is_completed()).count()
    }
}

fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Body of `POST /api/workflows/execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub description: String,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
}

/// Response of `POST /api/workflows/execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub workflow_id: String,
    #[serde(default)]
    pub status: Option<RunStatus>,
    /// Planned steps, all reported as pending at submission time.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Row of `GET /api/workflows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub workflow_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps_count: usize,
}

/// Row of `GET /api/executions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub workflow_id: String,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub last_step: Option<StepReference>,
    #[serde(default)]
    pub steps_completed: usize,
}

/// Row of `GET /api/extracted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub workflow_id: String,
    #[serde(default)]
    pub data: JsonValue,
}

/// `{ "items": [...] }` wrapper used by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ItemsEnvelope<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}
