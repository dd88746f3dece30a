//! Nibblix Edge Gateway Library

pub mod config;
pub mod http;
pub mod observability;
pub mod security;

pub use config::env::RuntimeEnv;
pub use config::schema::EdgeConfig;
pub use http::HttpServer;
pub use security::{HeaderPolicy, SecurityHeaders};
