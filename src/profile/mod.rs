//! Profile module: data types and whole-collection storage.
//!
//! This module handles:
//! - Profile and landmark types
//! - The storage interface and its JSON file implementation
//! - An in-memory store for testing

pub mod mock;
pub mod store;
pub mod types;

pub use mock::MemoryStore;
pub use store::{JsonFileStore, ProfileStore};
pub use types::{FaceData, Profile};
