//! ledsign-test-harness: Test utilities and mock transports for ledsign.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! sign protocol drivers without requiring a real sign.

pub mod mock_serial;

pub use mock_serial::MockTransport;
