mod dashboard_component;
mod state;

pub use dashboard_component::DashboardComponent;
pub use state::{DEFAULT_DESCRIPTION, DashboardState, FormFocus};
