//! Pure projections from engine state to the values the dashboard shows.
//!
//! Nothing here touches the terminal, so render decisions are tested on
//! plain data.

use automator_types::{ExecutionSummary, RunStatus, Step, WorkflowRun, WorkflowSummary};
use serde_json::Value as JsonValue;

/// A titled value shown in a tile row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub title: &'static str,
    pub value: String,
}

impl Tile {
    fn new(title: &'static str, value: impl Into<String>) -> Self {
        Self {
            title,
            value: value.into(),
        }
    }
}

/// Progress, status, current step and vision tiles.
pub fn metric_tiles(run: Option<&WorkflowRun>) -> [Tile; 4] {
    let progress = run.map_or(0, |run| run.progress);
    let status = run.map_or_else(|| "idle".to_string(), |run| run.status.to_string());
    let current_step = run
        .and_then(|run| run.current_step.as_ref())
        .and_then(|step| step.action_label())
        .unwrap_or("-")
        .to_string();
    let vision = run.is_some_and(|run| run.vision_enabled);

    [
        Tile::new("Progress", format!("{progress}%")),
        Tile::new("Status", status),
        Tile::new("Current Step", current_step),
        Tile::new("Vision", vision.to_string()),
    ]
}

/// Total, successful, failed and running counters.
///
/// `running` is the controller's view, not the snapshot's: a submission in
/// flight counts as running before any snapshot arrives.
pub fn stat_tiles(run: Option<&WorkflowRun>, running: bool) -> [Tile; 4] {
    let total = run.map_or(0, |run| run.steps.len());
    let successful = run.map_or(0, WorkflowRun::completed_steps);
    let failed = usize::from(run.is_some_and(|run| run.status == RunStatus::Failed));

    [
        Tile::new("Total Steps", total.to_string()),
        Tile::new("Successful", successful.to_string()),
        Tile::new("Failed", failed.to_string()),
        Tile::new("Running", usize::from(running).to_string()),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub title: String,
    pub subtitle: String,
    pub done: bool,
}

/// One entry per reported step, in the order the backend sent them.
pub fn timeline(steps: &[Step]) -> Vec<TimelineEntry> {
    steps
        .iter()
        .map(|step| TimelineEntry {
            title: step.step.clone(),
            subtitle: step
                .details
                .as_deref()
                .filter(|details| !details.is_empty())
                .map_or_else(|| step.status.to_string(), str::to_string),
            done: step.is_completed(),
        })
        .collect()
}

/// Steps to draw on the dashboard: the latest snapshot's, or the plan
/// announced at submission until the first snapshot lands.
pub fn dashboard_steps<'a>(run: Option<&'a WorkflowRun>, planned: &'a [Step]) -> &'a [Step] {
    match run {
        Some(run) => &run.steps,
        None => planned,
    }
}

pub const TIMELINE_EMPTY: &str = "No steps yet";

pub const WORKFLOWS_HEADER: [&str; 4] = ["ID", "Name", "Description", "Steps"];
pub const EXECUTIONS_HEADER: [&str; 5] = ["ID", "Status", "Progress", "Last Step", "Steps Completed"];

pub fn workflow_row(summary: &WorkflowSummary) -> [String; 4] {
    [
        summary.workflow_id.clone(),
        summary.name.clone().unwrap_or_default(),
        summary.description.clone().unwrap_or_default(),
        summary.steps_count.to_string(),
    ]
}

pub fn execution_row(summary: &ExecutionSummary) -> [String; 5] {
    let last_step = summary
        .last_step
        .as_ref()
        .and_then(|step| step.action_label())
        .unwrap_or("-");
    [
        summary.workflow_id.clone(),
        summary.status.to_string(),
        format!("{}%", summary.progress),
        last_step.to_string(),
        summary.steps_completed.to_string(),
    ]
}

/// Extracted payload pretty-printed with two-space indentation.
pub fn pretty_json(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// `•` repeated once per character, so the password length stays visible.
pub fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use automator_types::StepReference;
    use serde_json::json;

    fn step(name: &str, status: RunStatus, details: Option<&str>) -> Step {
        Step {
            step: name.into(),
            status,
            details: details.map(str::to_string),
        }
    }

    #[test]
    fn idle_dashboard_shows_defaults() {
        let values: Vec<String> = metric_tiles(None).into_iter().map(|tile| tile.value).collect();
        assert_eq!(values, ["0%", "idle", "-", "false"]);
        let stats: Vec<String> = stat_tiles(None, false).into_iter().map(|tile| tile.value).collect();
        assert_eq!(stats, ["0", "0", "0", "0"]);
    }

    #[test]
    fn running_snapshot_fills_tiles() {
        let run = WorkflowRun {
            workflow_id: "wf-1".into(),
            status: RunStatus::Running,
            progress: 40,
            current_step: Some(StepReference {
                action: Some("extract".into()),
                ..StepReference::default()
            }),
            steps: vec![step("login", RunStatus::Completed, None)],
            vision_enabled: true,
            result: None,
        };

        let metrics = metric_tiles(Some(&run));
        assert_eq!(metrics[0].value, "40%");
        assert_eq!(metrics[1].value, "running");
        assert_eq!(metrics[2].value, "extract");
        assert_eq!(metrics[3].value, "true");

        let stats = stat_tiles(Some(&run), true);
        assert_eq!(stats[0].value, "1");
        assert_eq!(stats[1].value, "1");
        assert_eq!(stats[2].value, "0");
        assert_eq!(stats[3].value, "1");
    }

    #[test]
    fn failed_run_counts_one_failure() {
        let run = WorkflowRun {
            status: RunStatus::Failed,
            steps: vec![step("login", RunStatus::Completed, None), step("click", RunStatus::Failed, None)],
            ..WorkflowRun::default()
        };
        let stats = stat_tiles(Some(&run), false);
        assert_eq!(stats[0].value, "2");
        assert_eq!(stats[1].value, "1");
        assert_eq!(stats[2].value, "1");
        assert_eq!(stats[3].value, "0");
    }

    #[test]
    fn blank_current_step_action_renders_dash() {
        let run = WorkflowRun {
            current_step: Some(StepReference::default()),
            ..WorkflowRun::default()
        };
        assert_eq!(metric_tiles(Some(&run))[2].value, "-");
    }

    #[test]
    fn timeline_prefers_details_over_status() {
        let entries = timeline(&[
            step("login", RunStatus::Completed, Some("signed in as a")),
            step("extract", RunStatus::Running, None),
            step("save", RunStatus::Pending, Some("")),
        ]);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].subtitle, "signed in as a");
        assert!(entries[0].done);
        assert_eq!(entries[1].subtitle, "running");
        assert!(!entries[1].done);
        assert_eq!(entries[2].subtitle, "pending");
    }

    #[test]
    fn planned_steps_shown_until_first_snapshot() {
        let planned = vec![step("login", RunStatus::Pending, None)];
        assert_eq!(dashboard_steps(None, &planned).len(), 1);
        let run = WorkflowRun::default();
        assert!(dashboard_steps(Some(&run), &planned).is_empty());
    }

    #[test]
    fn execution_row_without_last_step_uses_dash() {
        let summary = ExecutionSummary {
            workflow_id: "wf-2".into(),
            status: RunStatus::Completed,
            progress: 100,
            last_step: None,
            steps_completed: 3,
        };
        assert_eq!(execution_row(&summary), ["wf-2", "completed", "100%", "-", "3"]);
    }

    #[test]
    fn extracted_json_is_indented() {
        assert_eq!(pretty_json(&json!({"user": "a"})), "{\n  \"user\": \"a\"\n}");
    }

    #[test]
    fn mask_counts_characters() {
        assert_eq!(mask("pässword"), "••••••••");
        assert_eq!(mask(""), "");
    }
}
