//! Persistent Store collaborator
//!
//! The relay never writes to the store. It only reads profile rows to give
//! notifications a sender name.

pub mod directory;

pub use directory::{ProfileDirectory, ProfileSummary, RestProfileDirectory};
