mod auth;
mod communications;
mod dashboard;
mod names;
mod session;
mod templates;
mod types;

pub use auth::require_admin;
pub use communications::communications;
pub use dashboard::dashboard;
pub use names::{areas_page, delete_area, delete_service, save_area, save_service, services_page};
pub use session::{session_events, session_snapshot};
pub use templates::{delete_template, save_template, templates_page};
