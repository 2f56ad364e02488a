pub mod api;
pub mod app_config;
pub mod client;
pub mod notifications;
pub mod store;
pub mod sync;
pub mod validation;
