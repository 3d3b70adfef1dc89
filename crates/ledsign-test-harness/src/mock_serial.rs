//! Mock transport for deterministic testing of sign protocol drivers.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. This lets you test frame encoding, reply
//! classification, and session behaviour without a sign on the bench.
//!
//! # Example
//!
//! ```
//! use ledsign_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the driver sends this identity query, the sign answers "01".
//! mock.expect(b"<ID><01><E>", b"01");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use ledsign_core::error::{Error, Result};
use ledsign_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes the "sign" answers with. Empty means the sign stays silent.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing protocol drivers without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation. The
/// corresponding response is then handed out by subsequent `receive()`
/// calls, at most `buf.len()` bytes at a time. Once the response is
/// exhausted, `receive()` behaves like a silent link and returns `Ok(0)`.
///
/// With [`set_byte_delay`](Self::set_byte_delay) the response instead
/// trickles out one byte per `receive()`, each after the given delay, the
/// way a slow sign drains through a UART.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    pending_response: Vec<u8>,
    /// How many bytes of `pending_response` have been handed out.
    response_cursor: usize,
    connected: bool,
    /// Every `send()` payload, in order.
    sent_log: Vec<Vec<u8>>,
    /// Number of `receive()` calls made, including ones that timed out.
    receive_calls: usize,
    /// Delay before each response byte; `None` hands out bytes at once.
    byte_delay: Option<Duration>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: Vec::new(),
            response_cursor: 0,
            connected: true,
            sent_log: Vec::new(),
            receive_calls: 0,
            byte_delay: None,
        }
    }

    /// Add an expected request/response pair.
    ///
    /// When `send()` is called with data matching `request`, subsequent
    /// `receive()` calls will return the bytes of `response`.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Add an expected request the sign never answers.
    pub fn expect_silence(&mut self, request: &[u8]) {
        self.expect(request, &[]);
    }

    /// Return all data that has been sent through this transport.
    ///
    /// Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Return the number of response bytes that were scripted but never read.
    pub fn unread_response_bytes(&self) -> usize {
        self.pending_response.len() - self.response_cursor
    }

    /// Return how many times `receive()` has been called.
    pub fn receive_calls(&self) -> usize {
        self.receive_calls
    }

    /// Deliver response bytes one per `receive()`, each `delay` after the
    /// call starts.
    ///
    /// A call whose timeout is shorter than `delay` sleeps for the timeout
    /// and returns `Ok(0)` without consuming a byte.
    pub fn set_byte_delay(&mut self, delay: Duration) {
        self.byte_delay = Some(delay);
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        let expectation = self
            .expectations
            .pop_front()
            .ok_or_else(|| Error::Protocol("no more expectations in mock transport".into()))?;

        if data != expectation.request.as_slice() {
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            )));
        }

        self.pending_response = expectation.response;
        self.response_cursor = 0;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.receive_calls += 1;

        let start = self.response_cursor;
        let mut n = (self.pending_response.len() - start).min(buf.len());
        if let Some(delay) = self.byte_delay {
            if n > 0 && delay > timeout {
                tokio::time::sleep(timeout).await;
                return Ok(0);
            }
            if n > 0 {
                tokio::time::sleep(delay).await;
                n = 1;
            }
        }
        buf[..n].copy_from_slice(&self.pending_response[start..start + n]);
        self.response_cursor += n;
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response.clear();
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
