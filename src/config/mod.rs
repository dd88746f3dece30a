//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (schema validation, normalization)
//!     → RuntimeEnv (typed, validated)  — startup aborts on any error
//!
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config and environment are immutable once loaded
//! - All file config fields have defaults to allow minimal configs
//! - Environment variables have no such leniency: required means required
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every error, not just the first

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{Environment, RuntimeEnv};
pub use schema::{EdgeConfig, ListenerConfig, SecurityConfig, UpstreamConfig};
