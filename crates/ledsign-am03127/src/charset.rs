//! Text transcoding into the sign's single-byte character set.
//!
//! The AM03127 renders one byte per glyph and uses `<`/`>` as command
//! delimiters inside message text. Before a message can be embedded in a
//! page command it is transcoded:
//!
//! | Input                   | Output                        |
//! |-------------------------|-------------------------------|
//! | `ESC` `X` `Y`           | `<XY>` (inline command code)  |
//! | `\n`                    | space                         |
//! | `\r`                    | dropped                       |
//! | `{` / `}`               | `<` / `>`                     |
//! | `<` / `>`               | `<UBC>` / `<UBE>`             |
//! | anything else           | code-page byte                |
//!
//! Braces therefore let a caller write inline commands without an escape
//! character (`{CB}` becomes `<CB>`), while literal angle brackets in user
//! text are turned into the sign's own escape tokens.
//!
//! The code page is pluggable through [`CodePage`]; the boards sold in
//! Europe use [`Windows1252`].

use ledsign_core::{Error, Result};

/// Escape control code that introduces an inline two-character command.
pub const ESCAPE: char = '\u{1B}';

/// A single-byte character table for the sign's glyph ROM.
pub trait CodePage {
    /// Human-readable name of the table, used in log output.
    fn name(&self) -> &'static str;

    /// Map one character to its byte, or `None` if the table has no glyph.
    fn encode_char(&self, c: char) -> Option<u8>;
}

/// The Windows-1252 table.
///
/// ASCII and Latin-1 (`0xA0..=0xFF`) map to themselves; `0x80..=0x9F`
/// hold typographic characters. The five unassigned slots in that block
/// and everything outside the table are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Windows1252;

/// Characters assigned to `0x80..=0x9F`, indexed from `0x80`.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl CodePage for Windows1252 {
    fn name(&self) -> &'static str {
        "windows-1252"
    }

    fn encode_char(&self, c: char) -> Option<u8> {
        match c as u32 {
            cp @ (0x00..=0x7F | 0xA0..=0xFF) => Some(cp as u8),
            _ => WINDOWS_1252_HIGH
                .iter()
                .position(|&slot| slot == Some(c))
                .map(|i| 0x80 + i as u8),
        }
    }
}

/// Transcodes message text for a given [`CodePage`].
#[derive(Debug, Clone, Default)]
pub struct CharsetEncoder<C = Windows1252> {
    code_page: C,
}

impl<C: CodePage> CharsetEncoder<C> {
    /// Create an encoder backed by `code_page`.
    pub fn new(code_page: C) -> Self {
        CharsetEncoder { code_page }
    }

    /// Transcode `text` into bytes ready to embed in a page command.
    ///
    /// Fails with [`Error::InputUnderflow`] if an `ESC` is not followed by
    /// two characters, and with [`Error::UnsupportedCharacter`] for the
    /// first character the code page cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(text.len());
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            match c {
                ESCAPE => {
                    let (Some(a), Some(b)) = (chars.next(), chars.next()) else {
                        return Err(Error::InputUnderflow);
                    };
                    out.push(b'<');
                    out.push(self.byte_for(a)?);
                    out.push(self.byte_for(b)?);
                    out.push(b'>');
                }
                '\n' => out.push(b' '),
                '\r' => {}
                '{' => out.push(b'<'),
                '}' => out.push(b'>'),
                '<' => out.extend_from_slice(b"<UBC>"),
                '>' => out.extend_from_slice(b"<UBE>"),
                _ => out.push(self.byte_for(c)?),
            }
        }

        Ok(out)
    }

    fn byte_for(&self, c: char) -> Result<u8> {
        self.code_page.encode_char(c).ok_or_else(|| {
            tracing::debug!(code_page = self.code_page.name(), ?c, "no glyph for character");
            Error::UnsupportedCharacter(c)
        })
    }
}

/// Transcode `text` with the default [`Windows1252`] table.
pub fn encode_text(text: &str) -> Result<Vec<u8>> {
    CharsetEncoder::new(Windows1252).encode(text)
}
