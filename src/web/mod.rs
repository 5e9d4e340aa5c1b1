pub mod admin;
pub mod admin_utils;
pub mod auth;
pub mod contact;
pub mod i18n;
pub mod landing;
pub mod pages;
pub mod router;
pub mod state;
pub mod templates;

pub use auth::SESSION_COOKIE;
pub use state::AppState;
pub use templates::escape_html;
