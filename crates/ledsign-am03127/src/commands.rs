//! AM03127 command builders.
//!
//! This module constructs the bodies of the three commands the sign accepts
//! from this driver: page/display, clock set, and schedule. Bodies are pure
//! byte sequences without board addressing or checksum; wrap them with
//! [`encode_frame`](crate::protocol::encode_frame) before transmission.
//!
//! # Page command layout
//!
//! ```text
//! <Ln><Pp><Fl><Md><Ww><Fg><Cc><Af>message
//! ```
//!
//! | Tag  | Field    | Allowed                     |
//! |------|----------|-----------------------------|
//! | `L`  | line     | `1`-`8`                     |
//! | `P`  | page     | `A`-`Z`                     |
//! | `F`  | lead     | `A`-`S`                     |
//! | `M`  | display  | `ABCDEQRSTUabcdeqrstu`      |
//! | `W`  | wait     | 0-25 s, sent as `A`-`Z`     |
//! | `F`  | lag      | `A`-`S`                     |
//! | `C`  | colour   | `ABCDEFGHIJKLMNPQRS`        |
//! | `A`  | font     | `ABCDE`                     |

use std::fmt;

use chrono::{DateTime, Local, TimeZone};

use ledsign_core::{Error, Result};

/// Display modes accepted in the `<M_>` tag.
pub const DISPLAY_MODES: &str = "ABCDEQRSTUabcdeqrstu";

/// Colours accepted in the `<C_>` tag. There is no `O`.
pub const COLOURS: &str = "ABCDEFGHIJKLMNPQRS";

/// Fonts accepted in the `<A_>` tag.
pub const FONTS: &str = "ABCDE";

/// Longest wait time, in seconds. A wait of 0 means half a second.
pub const MAX_WAIT: u8 = 25;

/// Active window sent with every schedule: 2000-01-01 00:00 to 2099-12-31 23:59.
pub const SCHEDULE_WINDOW: &str = "00010100009912312359";

/// A command payload, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBody(Vec<u8>);

impl CommandBody {
    /// The raw body bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CommandBody {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CommandBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Parameters of a page/display command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFields {
    /// Target line, 1-8.
    pub line: u8,
    /// Page letter, `A`-`Z`.
    pub page: char,
    /// Lead (appear) effect, `A`-`S`.
    pub lead: char,
    /// Display mode / speed, one of [`DISPLAY_MODES`].
    pub display: char,
    /// Wait time in seconds, 0-25.
    pub wait: u8,
    /// Lag (disappear) effect, `A`-`S`.
    pub lag: char,
    /// Text colour, one of [`COLOURS`].
    pub colour: char,
    /// Font, one of [`FONTS`].
    pub font: char,
}

impl Default for PageFields {
    fn default() -> Self {
        PageFields {
            line: 1,
            page: 'A',
            lead: 'E',
            display: 'A',
            wait: 5,
            lag: 'E',
            colour: 'A',
            font: 'A',
        }
    }
}

/// One entry of the page-field validation table.
struct FieldRule {
    name: &'static str,
    /// Returns the rejected value, rendered, if the field is invalid.
    check: fn(&PageFields) -> Option<String>,
}

fn char_in_range(c: char, first: char, last: char) -> Option<String> {
    (!(first..=last).contains(&c)).then(|| c.to_string())
}

fn char_in_set(c: char, set: &str) -> Option<String> {
    (!set.contains(c)).then(|| c.to_string())
}

/// Validation table, evaluated in order; the first failure wins.
const PAGE_FIELD_RULES: [FieldRule; 8] = [
    FieldRule {
        name: "line",
        check: |f| (!(1..=8).contains(&f.line)).then(|| f.line.to_string()),
    },
    FieldRule {
        name: "page",
        check: |f| char_in_range(f.page, 'A', 'Z'),
    },
    FieldRule {
        name: "lead",
        check: |f| char_in_range(f.lead, 'A', 'S'),
    },
    FieldRule {
        name: "display",
        check: |f| char_in_set(f.display, DISPLAY_MODES),
    },
    FieldRule {
        name: "wait",
        check: |f| (f.wait > MAX_WAIT).then(|| f.wait.to_string()),
    },
    FieldRule {
        name: "lag",
        check: |f| char_in_range(f.lag, 'A', 'S'),
    },
    FieldRule {
        name: "colour",
        check: |f| char_in_set(f.colour, COLOURS),
    },
    FieldRule {
        name: "font",
        check: |f| char_in_set(f.font, FONTS),
    },
];

impl PageFields {
    /// Check every field, reporting the first violation in tag order.
    pub fn validate(&self) -> Result<()> {
        for rule in &PAGE_FIELD_RULES {
            if let Some(value) = (rule.check)(self) {
                return Err(Error::InvalidField {
                    field: rule.name,
                    value,
                });
            }
        }
        Ok(())
    }

    /// The wait time as sent on the wire: `'A' + wait`.
    fn wait_code(&self) -> char {
        char::from(b'A' + self.wait)
    }
}

/// Build a page/display command carrying `message`.
///
/// `message` must already be transcoded with
/// [`encode_text`](crate::charset::encode_text). Nothing is built if any
/// field is invalid.
///
/// # Example
///
/// ```
/// use ledsign_am03127::commands::{PageFields, build_page_command};
///
/// let body = build_page_command(&PageFields::default(), b"HELLO").unwrap();
/// assert_eq!(body.as_bytes(), b"<L1><PA><FE><MA><WF><FE><CA><AA>HELLO");
/// ```
pub fn build_page_command(fields: &PageFields, message: &[u8]) -> Result<CommandBody> {
    fields.validate()?;

    let header = format!(
        "<L{}><P{}><F{}><M{}><W{}><F{}><C{}><A{}>",
        fields.line,
        fields.page,
        fields.lead,
        fields.display,
        fields.wait_code(),
        fields.lag,
        fields.colour,
        fields.font,
    );

    let mut body = Vec::with_capacity(header.len() + message.len());
    body.extend_from_slice(header.as_bytes());
    body.extend_from_slice(message);
    Ok(CommandBody(body))
}

/// Build a clock-set command for `time`.
///
/// Renders `<SC>YY0WMMDDHHMMSS` in the calendar of `time`'s own zone,
/// where `W` is the ISO weekday (Monday = 1).
pub fn build_clock_command<Tz: TimeZone>(time: &DateTime<Tz>) -> CommandBody
where
    Tz::Offset: fmt::Display,
{
    CommandBody(time.format("<SC>%y0%u%m%d%H%M%S").to_string().into_bytes())
}

/// Build a clock-set command for the current local time.
pub fn build_clock_command_now() -> CommandBody {
    build_clock_command(&Local::now())
}

/// Build a schedule command that cycles through `pages`.
///
/// `pages` is a run of page letters (e.g. `"ABC"`) and is passed through
/// untouched.
pub fn build_schedule_command(pages: &str) -> CommandBody {
    let mut body = Vec::with_capacity(4 + SCHEDULE_WINDOW.len() + pages.len());
    body.extend_from_slice(b"<TA>");
    body.extend_from_slice(SCHEDULE_WINDOW.as_bytes());
    body.extend_from_slice(pages.as_bytes());
    CommandBody(body)
}
