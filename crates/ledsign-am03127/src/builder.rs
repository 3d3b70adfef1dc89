//! SignBuilder -- fluent builder for constructing [`SignSession`] instances.
//!
//! Separates configuration from construction so that callers can pick the
//! serial port, baud rate, target board and reply timeout before the port
//! is opened.
//!
//! # Example
//!
//! ```no_run
//! use ledsign_am03127::builder::SignBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> ledsign_core::Result<()> {
//! let mut sign = SignBuilder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .board_id(1)
//!     .read_timeout(Duration::from_millis(500))
//!     .build()
//!     .await?;
//! sign.set_schedule("AB").await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use ledsign_core::error::{Error, Result};
use ledsign_core::transport::Transport;
use ledsign_transport::{DEFAULT_BAUD_RATE, SerialTransport};

use crate::protocol::BoardId;
use crate::session::{DEFAULT_READ_TIMEOUT, SignSession};

/// Fluent builder for [`SignSession`].
///
/// Defaults: board id 1, 9600 baud, one second per reply byte.
pub struct SignBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    board: BoardId,
    read_timeout: Duration,
}

impl Default for SignBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SignBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        SignBuilder {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            board: BoardId::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate (9600).
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Address the board with this id.
    pub fn board_id(mut self, board: u8) -> Self {
        self.board = BoardId::new(board);
        self
    }

    /// Set how long to wait for each byte of the sign's reply.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Build a [`SignSession`] with a caller-provided transport.
    ///
    /// This is the entry point for testing (pass a `MockTransport` from
    /// `ledsign-test-harness`) and for callers that manage the link
    /// themselves.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<SignSession> {
        if self.read_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "read_timeout must be greater than zero".into(),
            ));
        }
        Ok(SignSession::new(transport, self.board, self.read_timeout))
    }

    /// Open the configured serial port and build a [`SignSession`] on it.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<SignSession> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;

        let transport = SerialTransport::open(port, self.baud_rate).await?;
        self.build_with_transport(Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_schedule_command;
    use crate::protocol::encode_frame;
    use crate::reply::ReplyOutcome;
    use ledsign_test_harness::MockTransport;

    #[test]
    fn builder_defaults() {
        let session = SignBuilder::new()
            .build_with_transport(Box::new(MockTransport::new()))
            .unwrap();
        assert_eq!(session.board(), BoardId::new(1));
        assert_eq!(session.read_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn builder_custom_settings() {
        let session = SignBuilder::new()
            .serial_port("/dev/ttyUSB0")
            .baud_rate(19_200)
            .board_id(0x42)
            .read_timeout(Duration::from_millis(250))
            .build_with_transport(Box::new(MockTransport::new()))
            .unwrap();
        assert_eq!(session.board(), BoardId::new(0x42));
        assert_eq!(session.read_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let result = SignBuilder::new()
            .read_timeout(Duration::ZERO)
            .build_with_transport(Box::new(MockTransport::new()));
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = SignBuilder::new().build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn build_reports_unopenable_port() {
        let result = SignBuilder::new()
            .serial_port("/dev/ledsign-missing")
            .baud_rate(19_200)
            .build()
            .await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn built_session_addresses_configured_board() {
        let body = build_schedule_command("A");
        let mut mock = MockTransport::new();
        mock.expect(&encode_frame(BoardId::new(9), &body), b"ACK");

        let mut session = SignBuilder::new()
            .board_id(9)
            .build_with_transport(Box::new(mock))
            .unwrap();
        assert_eq!(
            session.exchange(&body).await.unwrap(),
            ReplyOutcome::Acknowledged
        );
    }
}
