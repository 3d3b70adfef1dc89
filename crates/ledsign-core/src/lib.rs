//! ledsign-core: Core traits and error definitions for ledsign.
//!
//! This crate defines the protocol-agnostic pieces shared by every ledsign
//! crate: the byte-level [`Transport`] link and the [`Error`] / [`Result`]
//! types. Applications that only need to pass a link around can depend on
//! this crate without pulling in a specific sign driver.

pub mod error;
pub mod transport;

pub use error::{Error, Result};
pub use transport::Transport;
