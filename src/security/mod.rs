//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → matcher.rs (is this request exempt? path rules + prefetch headers)
//!     → forward to upstream
//! Outgoing response (when not exempt):
//!     → headers.rs (apply the fixed security header set)
//! ```
//!
//! # Design Decisions
//! - Header set and policy are immutable after startup
//! - Matching is a pure function: no shared mutable state, no coordination
//! - Header application is atomic: the full set or nothing

pub mod headers;
pub mod matcher;

pub use headers::SecurityHeaders;
pub use matcher::HeaderPolicy;
