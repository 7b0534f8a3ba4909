//! Facial-landmark profile registry.
//!
//! A small HTTP service that enrolls, lists, updates and verifies facial
//! landmark profiles keyed by user id. Profiles live in one JSON file that is
//! read and rewritten as a whole on every request.
//!
//! # Matching
//!
//! Submitted landmarks match an enrolled profile when the Euclidean distance
//! between the two coordinate lists is below 1.0:
//!
//! ```text
//! stored:    [0.0, 0.0]
//! submitted: [3.0, 4.0]
//! ─────────────────────
//! distance:  5.0 >= 1.0  → rejected
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`profile`]: Profile types and whole-collection storage
//! - [`matcher`]: Landmark distance and threshold
//! - [`api`]: HTTP handlers and routes
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod profile;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
