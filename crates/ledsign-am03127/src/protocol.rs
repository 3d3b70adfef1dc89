//! AM03127 frame encoder.
//!
//! Every command travels inside an ASCII envelope addressed to one board on
//! the bus and closed by an XOR checksum of the body:
//!
//! ```text
//! <ID{board:02X}>{body}{checksum:02X}<E>
//! ```
//!
//! - `board`: the target board id, 0-255, as two uppercase hex digits.
//! - `body`: a command body from [`commands`](crate::commands).
//! - `checksum`: XOR of every body byte (header and trailer excluded),
//!   as two uppercase hex digits.
//!
//! The identity query is the one frame without a checksum:
//!
//! ```text
//! <ID><{board:02X}><E>
//! ```
//!
//! A board that receives it adopts `board` as its id and echoes the two
//! hex digits back.

use std::fmt;

use bytes::{BufMut, BytesMut};

use ledsign_core::{Error, Result};

use crate::commands::CommandBody;

/// Trailer closing every frame.
pub const END_TAG: &[u8] = b"<E>";

/// Address of one board on the sign bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardId(u8);

impl BoardId {
    /// Create a board id from a raw byte; every `u8` is valid.
    pub const fn new(id: u8) -> Self {
        BoardId(id)
    }

    /// The raw id.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The id as it appears on the wire: two uppercase hex digits.
    pub fn to_hex(self) -> String {
        format!("{:02X}", self.0)
    }
}

impl Default for BoardId {
    fn default() -> Self {
        BoardId(1)
    }
}

impl From<u8> for BoardId {
    fn from(id: u8) -> Self {
        BoardId(id)
    }
}

impl TryFrom<i64> for BoardId {
    type Error = Error;

    fn try_from(id: i64) -> Result<Self> {
        u8::try_from(id)
            .map(BoardId)
            .map_err(|_| Error::InvalidBoardId(id))
    }
}

impl TryFrom<u32> for BoardId {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        BoardId::try_from(i64::from(id))
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// XOR of every byte in `body`.
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, &b| acc ^ b)
}

/// Render a checksum as two uppercase hex digits.
pub fn format_checksum(sum: u8) -> String {
    format!("{sum:02X}")
}

/// Parse the two-hex-digit rendering produced by [`format_checksum`].
pub fn parse_checksum(text: &str) -> Result<u8> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::Protocol(format!(
            "checksum must be two hex digits, got {text:?}"
        )));
    }
    u8::from_str_radix(text, 16)
        .map_err(|e| Error::Protocol(format!("invalid checksum {text:?}: {e}")))
}

/// Wrap `body` in the addressed, checksummed envelope.
///
/// # Example
///
/// ```
/// use ledsign_am03127::commands::build_schedule_command;
/// use ledsign_am03127::protocol::{BoardId, encode_frame};
///
/// let body = build_schedule_command("A");
/// let frame = encode_frame(BoardId::new(1), &body);
/// assert!(frame.starts_with(b"<ID01><TA>"));
/// assert!(frame.ends_with(b"<E>"));
/// ```
pub fn encode_frame(board: BoardId, body: &CommandBody) -> Vec<u8> {
    let body = body.as_bytes();
    let header = format!("<ID{board}>");
    let trailer = format_checksum(checksum(body));

    let mut buf = BytesMut::with_capacity(header.len() + body.len() + trailer.len() + END_TAG.len());
    buf.put_slice(header.as_bytes());
    buf.put_slice(body);
    buf.put_slice(trailer.as_bytes());
    buf.put_slice(END_TAG);
    buf.to_vec()
}

/// Build the identity query / id assignment frame for `board`.
pub fn encode_identity_query(board: BoardId) -> Vec<u8> {
    format!("<ID><{board}><E>").into_bytes()
}
