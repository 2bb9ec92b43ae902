//! Property-based tests

#[cfg(feature = "ssr")]
pub mod presence_proptest;
