//! Theme styling for the dashboard.
//!
//! A single Nord palette is exposed through semantic [`Theme`] roles. Prefer
//! the helpers in [`theme_helpers`] over hard-coding colors.

pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use nord::NordTheme;
pub use roles::Theme;

pub fn load() -> Box<dyn Theme> {
    Box::new(NordTheme::new())
}
