//! Test module for determinism and integration tests.
//!
//! This module exercises the battle engine end to end:
//! - **Determinism tests**: the same seed and inputs produce the same event log
//! - **Integration tests**: full battles through the public entry points
//! - **Helper functions**: hosts, scripted enemies, and battle setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify deterministic execution
//! - `integration.rs`: End-to-end tests of the turn cycle, cards, relics
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;
mod integration;

pub use helpers::*;
