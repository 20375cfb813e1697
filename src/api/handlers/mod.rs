//! HTTP request handlers for API endpoints.

pub mod analytics;
pub mod health;
pub mod redirect;
pub mod shorten;
pub mod sync;
pub mod trending;

pub use analytics::{analytics_handler, delete_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use sync::sync_handler;
pub use trending::trending_handler;
