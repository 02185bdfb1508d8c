//! Shared test utilities for cardmill integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring the service against an in-memory database, a
//!   scripted backend and a deterministic scheduler
//! - JSON builders for backend responses

#![allow(dead_code)]

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{MockBackend, TestHarness};
