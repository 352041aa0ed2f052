//! Test helpers module
//!
//! This module provides utilities and helpers for testing the BloodLink API:
//! a test database, a router driver and generated test identities.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_app;
pub mod test_data;

pub use database_helper::*;
pub use test_app::*;
pub use test_data::*;
