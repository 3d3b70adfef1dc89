//! Error types for ledsign.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Caller mistakes (bad fields, text the
//! sign cannot display), transport failures, and protocol violations are
//! all captured here.
//!
//! Reply outcomes such as a negative acknowledgement or a silent sign are
//! *not* errors; those are reported as values by the protocol driver.

/// The error type for all ledsign operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A command field failed its range or membership check.
    ///
    /// `field` names the offending field (e.g. `"line"`, `"colour"`) and
    /// `value` is its rendering as supplied by the caller.
    #[error("invalid {field}: {value:?}")]
    InvalidField {
        /// Name of the field that failed validation.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A board id outside 0..=255.
    #[error("board id {0} not in range 0..=255")]
    InvalidBoardId(i64),

    /// The text contains a character the sign's code page cannot represent.
    #[error("unsupported character {0:?}")]
    UnsupportedCharacter(char),

    /// An escape code was not followed by its two-character command code.
    #[error("escape sequence truncated: expected two characters after ESC")]
    InputUnderflow,

    /// The sign did not answer an identity query within the read timeout.
    #[error("timeout reading from link")]
    LinkTimeout,

    /// An invalid parameter was passed to a builder or helper.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A transport-level error (serial port open/configure failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (malformed checksum rendering, unexpected data).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No connection to the sign has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the sign was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
