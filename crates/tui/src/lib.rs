//! # Workflow Automator TUI
//!
//! Terminal dashboard for the workflow automation backend. It submits a
//! workflow description with credentials and follows the run until it
//! settles. It can also browse the workflows, executions and extracted data
//! the backend has recorded.
//!
//! ## Architecture
//!
//! - `app`: state owned by the event loop (controller, page store, form)
//! - `ui::runtime`: terminal setup and the `tokio::select!` loop
//! - `ui::components`: one component per view, each rendering from `App`
//! - `view_model`: pure projections that decide what the views show
//!
//! Logging must go to a file while the TUI runs; the alternate screen owns
//! stdout.

mod app;
mod ui;
pub mod view_model;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::{Context, Result};
use automator_api::{AutomatorClient, WorkflowApi};
use automator_util::AutomatorConfig;

/// Runs the dashboard until the user quits.
///
/// # Errors
///
/// Fails when the API client cannot be built from `config` or when the
/// terminal cannot be set up.
pub async fn run(config: &AutomatorConfig) -> Result<()> {
    let client = AutomatorClient::from_config(config).context("build API client")?;
    let api_base = client.base_url().to_string();
    let api: Arc<dyn WorkflowApi> = Arc::new(client);
    ui::runtime::run_app(api, config.poll_interval, api_base).await
}
