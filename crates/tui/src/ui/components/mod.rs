pub mod component;
pub mod dashboard;
pub mod execution_detail;
pub mod lists;
pub mod nav_bar;
pub mod text_field;

pub(crate) use component::Component;
pub use dashboard::DashboardComponent;
pub use execution_detail::ExecutionDetailComponent;
pub use lists::ListPageComponent;
pub use nav_bar::TopBarComponent;
