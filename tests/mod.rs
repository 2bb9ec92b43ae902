//! Test suite for Chatwire
//!
//! This module organizes all tests

pub mod common;
pub mod property;
