//! Shared types for the Workflow Automator client crates.
//!
//! `workflow` holds the backend wire models. The navigation and effect enums
//! below are consumed by both the engine (which fetches per page) and the TUI
//! (which routes between pages).

pub mod workflow;

use indexmap::IndexMap;

pub use workflow::{
    ExecutionSummary, ExtractedRecord, ItemsEnvelope, RunStatus, Step, StepReference, SubmitRequest, SubmitResponse,
    WorkflowRun, WorkflowSummary,
};

/// A page whose content is fetched once per visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    Workflows,
    Executions,
    Extracted,
    /// Detail of a single execution, keyed by workflow id.
    ExecutionDetail(String),
}

impl Page {
    /// Human-readable title, also used in log fields.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Workflows => "Workflows",
            Self::Executions => "Executions",
            Self::Extracted => "Extracted Data",
            Self::ExecutionDetail(_) => "Execution",
        }
    }
}

/// Top-level screens of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Dashboard,
    Workflows,
    Executions,
    Extracted,
    ExecutionDetail(String),
}

impl Route {
    /// The single-fetch page backing this route, if any.
    pub fn page(&self) -> Option<Page> {
        match self {
            Self::Dashboard => None,
            Self::Workflows => Some(Page::Workflows),
            Self::Executions => Some(Page::Executions),
            Self::Extracted => Some(Page::Extracted),
            Self::ExecutionDetail(id) => Some(Page::ExecutionDetail(id.clone())),
        }
    }

    /// Tabs shown in the navigation bar, in display order.
    pub fn tabs() -> [Route; 4] {
        [Route::Dashboard, Route::Workflows, Route::Executions, Route::Extracted]
    }

    pub fn tab_label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Workflows => "Workflows",
            Self::Executions | Self::ExecutionDetail(_) => "Executions",
            Self::Extracted => "Extracted Data",
        }
    }
}

/// Side effects requested by UI components and executed by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start a fresh workflow run, replacing any run in progress.
    SubmitWorkflow {
        description: String,
        parameters: IndexMap<String, String>,
    },
    /// Navigate to another route; the runtime handles page activation.
    Navigate(Route),
    /// Leave the application.
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_has_no_fetch_page() {
        assert_eq!(Route::Dashboard.page(), None);
        assert_eq!(Route::Extracted.page(), Some(Page::Extracted));
        assert_eq!(
            Route::ExecutionDetail("wf-9".into()).page(),
            Some(Page::ExecutionDetail("wf-9".into()))
        );
    }

    #[test]
    fn execution_detail_highlights_executions_tab() {
        assert_eq!(Route::ExecutionDetail("wf".into()).tab_label(), Route::Executions.tab_label());
    }
}
