mod list_component;
mod state;

pub use list_component::{LOADING, ListPageComponent};
pub use state::ListSelection;
