//! # Workflow Automator Engine
//!
//! Client-side state for the automation dashboard. The engine never executes
//! workflows; it submits them to the backend and tracks what the backend
//! reports.
//!
//! ## Architecture
//!
//! - **`controller`**: [`PollingController`], the owner of the current run. It
//!   submits, spawns one polling session, and applies the session's events.
//! - **`poller`**: the cancellable task that polls run status on a fixed period.
//! - **`store`**: [`ViewStateStore`], single-fetch load state for list and
//!   detail pages.
//!
//! Both owners follow the same shape: background tasks report over an
//! unbounded channel, and the event loop that owns the state feeds each event
//! back through `apply`, which returns whether anything visible changed.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use automator_engine::{DEFAULT_POLL_PERIOD, PollingController};
//!
//! let (mut controller, mut events) = PollingController::new(Arc::new(client), DEFAULT_POLL_PERIOD);
//! controller.submit("Log in and extract the dashboard", parameters);
//! while let Some(event) = events.recv().await {
//!     controller.apply(event);
//!     if controller.phase().is_terminal() {
//!         break;
//!     }
//! }
//! ```

pub mod controller;
mod poller;
pub mod store;

#[cfg(test)]
mod testing;

pub use controller::{DEFAULT_POLL_PERIOD, PollError, PollPhase, PollingController};
pub use poller::{PollEvent, PollEventReceiver, PollOutcome, SessionId, drive_status_polling};
pub use store::{ListEvent, ListEventReceiver, ListPayload, LoadState, ViewStateStore};
