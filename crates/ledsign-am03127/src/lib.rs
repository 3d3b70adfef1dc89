//! AM03127 LED sign protocol driver for ledsign.
//!
//! This crate implements the ASCII command protocol spoken by AM03127 /
//! AM03128 LED message boards (vendor document AM004, v2.2). It provides:
//!
//! - **Charset** ([`charset`]) -- transcode text into the sign's single-byte
//!   code page, with inline-command escapes and delimiter substitution.
//! - **Command builders** ([`commands`]) -- validated page/display, clock
//!   and schedule command bodies.
//! - **Frame codec** ([`protocol`]) -- board addressing, XOR checksum, and
//!   the identity-query frame.
//! - **Reply classifier** ([`reply`]) -- byte-at-a-time prefix matching of
//!   the sign's `ACK` / `NACK` answers.
//! - **Session** ([`session`]) -- one-frame-at-a-time exchanges over a
//!   [`Transport`](ledsign_core::Transport).
//! - **Builder** ([`builder`]) -- fluent construction of a [`SignSession`]
//!   on a serial port.
//!
//! # Example
//!
//! ```
//! use ledsign_am03127::charset::encode_text;
//! use ledsign_am03127::commands::{PageFields, build_page_command};
//! use ledsign_am03127::protocol::{BoardId, encode_frame};
//!
//! let message = encode_text("Hello\nworld").unwrap();
//! let body = build_page_command(&PageFields::default(), &message).unwrap();
//! let frame = encode_frame(BoardId::new(1), &body);
//! assert!(frame.starts_with(b"<ID01><L1><PA>"));
//! ```

pub mod builder;
pub mod charset;
pub mod commands;
pub mod protocol;
pub mod reply;
pub mod session;

pub use builder::SignBuilder;
pub use commands::{CommandBody, PageFields};
pub use protocol::BoardId;
pub use reply::ReplyOutcome;
pub use session::SignSession;
