//! Transport implementations for ledsign.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](ledsign_core::Transport) trait from `ledsign-core`:
//!
//! - [`SerialTransport`]: USB-to-serial adapters and RS-232/RS-485 links
//!
//! # Example
//!
//! ```no_run
//! use ledsign_transport::SerialTransport;
//! use ledsign_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> ledsign_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600).await?;
//! transport.send(b"<ID><01><E>").await?;
//!
//! let mut buf = [0u8; 2];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DEFAULT_BAUD_RATE, SerialTransport};
