//! Application state for the dashboard.
//!
//! `App` owns the polling controller, the page store, and the UI-only state
//! (route, form, list selection, health badge). Components read it to render
//! and return `Effect`s; the runtime applies those effects here.

use std::sync::Arc;
use std::time::Duration;

use automator_api::WorkflowApi;
use automator_engine::{ListEvent, ListEventReceiver, PollEvent, PollEventReceiver, PollingController, ViewStateStore};
use automator_types::{Page, Route};
use tracing::debug;

use crate::ui::components::dashboard::DashboardState;
use crate::ui::components::lists::ListSelection;
use crate::ui::theme::{self, Theme};

/// Result of the one-shot startup health check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HealthStatus {
    #[default]
    Checking,
    Online,
    Offline,
}

/// Receivers the runtime multiplexes alongside terminal input.
pub struct AppChannels {
    pub poll_events: PollEventReceiver,
    pub list_events: ListEventReceiver,
}

pub struct App {
    pub theme: Box<dyn Theme>,
    pub route: Route,
    pub controller: PollingController,
    pub store: ViewStateStore,
    pub health: HealthStatus,
    pub dashboard: DashboardState,
    pub selection: ListSelection,
    pub api_base: String,
    /// Advances while a run is active; drives the running indicator.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(api: Arc<dyn WorkflowApi>, poll_period: Duration, api_base: impl Into<String>) -> (Self, AppChannels) {
        let (controller, poll_events) = PollingController::new(Arc::clone(&api), poll_period);
        let (store, list_events) = ViewStateStore::new(api);
        let app = Self {
            theme: theme::load(),
            route: Route::Dashboard,
            controller,
            store,
            health: HealthStatus::Checking,
            dashboard: DashboardState::default(),
            selection: ListSelection::default(),
            api_base: api_base.into(),
            spinner_frame: 0,
        };
        (app, AppChannels { poll_events, list_events })
    }

    /// Switch routes. The page being left stops its fetch; the page entered
    /// starts exactly one.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        if let Some(page) = self.route.page() {
            self.store.deactivate(&page);
        }
        debug!(from = ?self.route, to = ?route, "navigating");
        if let Some(page) = route.page() {
            self.store.activate(page);
        }
        self.route = route;
    }

    /// Route that `Esc` returns to, if any.
    pub fn back_route(&self) -> Option<Route> {
        match self.route {
            Route::Dashboard => None,
            Route::ExecutionDetail(_) => Some(Route::Executions),
            _ => Some(Route::Dashboard),
        }
    }

    pub fn apply_poll_event(&mut self, event: PollEvent) -> bool {
        self.controller.apply(event)
    }

    pub fn apply_list_event(&mut self, event: ListEvent) -> bool {
        let page = event.page.clone();
        let changed = self.store.apply(event);
        if changed {
            let len = self.item_count(&page);
            self.selection.clamp(&page, len);
        }
        changed
    }

    pub fn set_health(&mut self, healthy: bool) -> bool {
        let health = if healthy { HealthStatus::Online } else { HealthStatus::Offline };
        let changed = self.health != health;
        self.health = health;
        changed
    }

    /// Number of rows currently loaded for a list page.
    pub fn item_count(&self, page: &Page) -> usize {
        match page {
            Page::Workflows => self.store.workflows().ready().map_or(0, Vec::len),
            Page::Executions => self.store.executions().ready().map_or(0, Vec::len),
            Page::Extracted => self.store.extracted().ready().map_or(0, Vec::len),
            Page::ExecutionDetail(_) => 0,
        }
    }

    /// Workflow id of the highlighted executions row.
    pub fn selected_execution_id(&self) -> Option<String> {
        let items = self.store.executions().ready()?;
        items
            .get(self.selection.get(&Page::Executions))
            .map(|summary| summary.workflow_id.clone())
    }
}
