//! Transport trait for sign communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a sign.
//! The serial implementation lives in `ledsign-transport`; a scripted mock
//! for tests lives in `ledsign-test-harness`.
//!
//! Protocol drivers (e.g. the AM03127 session in `ledsign-am03127`) operate
//! on a `Transport` rather than directly on a serial port, so the same code
//! runs against real hardware and against deterministic test doubles.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a sign.
///
/// A transport is used by exactly one session at a time; callers never
/// interleave reads and writes from different tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the sign.
    ///
    /// Implementations should not return until all bytes have been written
    /// and flushed to the underlying link.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive up to `buf.len()` bytes from the sign.
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// requested. Returns `Ok(0)` if `timeout` elapses before any byte
    /// arrives; a silent link is not an error at this layer.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
