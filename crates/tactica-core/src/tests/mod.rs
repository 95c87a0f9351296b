//! Test module for determinism and integration tests.
//!
//! This module exercises the resolver end to end through [`Battle`]:
//! - **Determinism tests**: Verify same seed and intents produce identical battles
//! - **Integration tests**: Rule properties and worked scenarios across modules
//! - **Helper functions**: Utilities for test setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Replay and resume checks
//! - `integration.rs`: End-to-end rule tests, including property tests
//! - `helpers.rs`: Test setup utilities and factory functions
//!
//! [`Battle`]: crate::battle::Battle

mod helpers;
