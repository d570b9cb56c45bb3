//! GUI module - User interface components

mod app;
mod dashboard;
mod sidebar;

pub use app::FisioDashApp;
pub use dashboard::Dashboard;
pub use sidebar::{Sidebar, SidebarAction};
