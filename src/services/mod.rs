pub mod chart_service;
pub mod refresh_service;

pub use refresh_service::RefreshDriver;
