//! Incremental classification of the sign's reply to a frame.
//!
//! After a frame is written the sign answers with one of a few fixed ASCII
//! tokens (`ACK` or `NACK`), with no terminator. The classifier is fed the
//! reply one byte at a time and keeps the set of tokens the bytes seen so
//! far are still a prefix of. It finishes as soon as:
//!
//! - a token is matched in full, yielding that token's outcome;
//! - no token can match any more, yielding [`ReplyOutcome::Malformed`]
//!   with the bytes received, without waiting for more input.
//!
//! A read timeout is reported as [`ReplyOutcome::TimedOut`] by the caller
//! through [`ReplyClassifier::timed_out`].

use std::fmt;

/// How an exchange with the sign ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The sign accepted the frame (`ACK`).
    Acknowledged,
    /// The sign rejected the frame (`NACK`).
    NegativeAcknowledged,
    /// No reply arrived before the read timeout.
    TimedOut,
    /// The sign sent bytes that cannot form any known reply.
    Malformed(Vec<u8>),
}

impl ReplyOutcome {
    /// `true` only for [`ReplyOutcome::Acknowledged`].
    pub fn is_ack(&self) -> bool {
        matches!(self, ReplyOutcome::Acknowledged)
    }
}

impl fmt::Display for ReplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyOutcome::Acknowledged => f.write_str("ACK"),
            ReplyOutcome::NegativeAcknowledged => f.write_str("NACK"),
            ReplyOutcome::TimedOut => f.write_str("TIMEOUT"),
            ReplyOutcome::Malformed(bytes) => {
                write!(f, "malformed reply {:?}", String::from_utf8_lossy(bytes))
            }
        }
    }
}

/// A complete reply the sign may send, and what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyToken {
    /// The exact bytes on the wire.
    pub bytes: &'static [u8],
    /// The outcome reported when `bytes` is matched in full.
    pub outcome: ReplyOutcome,
}

/// The replies an AM03127 sends after a frame.
pub static AM03127_REPLIES: &[ReplyToken] = &[
    ReplyToken {
        bytes: b"ACK",
        outcome: ReplyOutcome::Acknowledged,
    },
    ReplyToken {
        bytes: b"NACK",
        outcome: ReplyOutcome::NegativeAcknowledged,
    },
];

/// Result of feeding one byte to a [`ReplyClassifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Some token is still possible; read another byte.
    NeedMore,
    /// The reply is classified; stop reading.
    Done(ReplyOutcome),
}

/// Prefix automaton over a fixed set of reply tokens.
///
/// The candidate set only ever shrinks. Classification therefore ends after
/// at most as many bytes as the longest token.
#[derive(Debug, Clone)]
pub struct ReplyClassifier {
    candidates: Vec<&'static ReplyToken>,
    buf: Vec<u8>,
}

impl Default for ReplyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyClassifier {
    /// A classifier for the AM03127 `ACK`/`NACK` replies.
    pub fn new() -> Self {
        Self::with_tokens(AM03127_REPLIES)
    }

    /// A classifier over a custom token set.
    pub fn with_tokens(tokens: &'static [ReplyToken]) -> Self {
        ReplyClassifier {
            candidates: tokens.iter().collect(),
            buf: Vec::new(),
        }
    }

    /// Bytes received so far.
    pub fn received(&self) -> &[u8] {
        &self.buf
    }

    /// Tokens still consistent with the bytes received so far.
    pub fn candidates(&self) -> impl Iterator<Item = &'static [u8]> + '_ {
        self.candidates.iter().map(|t| t.bytes)
    }

    /// Length of the longest token, i.e. the most bytes ever consumed.
    pub fn max_len(&self) -> usize {
        self.candidates
            .iter()
            .map(|t| t.bytes.len())
            .max()
            .unwrap_or(0)
    }

    /// Feed the next byte read from the link.
    pub fn push(&mut self, byte: u8) -> Step {
        self.buf.push(byte);
        let len = self.buf.len();
        let buf = &self.buf;
        self.candidates
            .retain(|t| t.bytes.len() >= len && &t.bytes[..len] == buf.as_slice());

        if self.candidates.is_empty() {
            return Step::Done(ReplyOutcome::Malformed(self.buf.clone()));
        }

        match self.candidates.iter().find(|t| t.bytes.len() == len) {
            Some(token) => Step::Done(token.outcome.clone()),
            None => Step::NeedMore,
        }
    }

    /// Outcome when the read timeout elapses before classification ends.
    ///
    /// A silent link and a reply cut off part-way are both reported as
    /// [`ReplyOutcome::TimedOut`].
    pub fn timed_out(&self) -> ReplyOutcome {
        ReplyOutcome::TimedOut
    }
}

/// Classify a complete reply held in memory.
///
/// Bytes after the point where classification finishes are ignored; an
/// empty or truncated reply counts as a timeout.
pub fn classify(reply: &[u8]) -> ReplyOutcome {
    let mut classifier = ReplyClassifier::new();
    for &b in reply {
        if let Step::Done(outcome) = classifier.push(b) {
            return outcome;
        }
    }
    classifier.timed_out()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_is_acknowledged() {
        assert_eq!(classify(b"ACK"), ReplyOutcome::Acknowledged);
    }

    #[test]
    fn nack_is_negative() {
        assert_eq!(classify(b"NACK"), ReplyOutcome::NegativeAcknowledged);
    }

    #[test]
    fn nothing_is_timeout() {
        assert_eq!(classify(b""), ReplyOutcome::TimedOut);
    }

    #[test]
    fn truncated_is_timeout() {
        assert_eq!(classify(b"NAC"), ReplyOutcome::TimedOut);
    }

    #[test]
    fn acx_is_malformed_after_third_byte() {
        let mut c = ReplyClassifier::new();
        assert_eq!(c.push(b'A'), Step::NeedMore);
        assert_eq!(c.push(b'C'), Step::NeedMore);
        assert_eq!(c.candidates().collect::<Vec<_>>(), vec![&b"ACK"[..]]);
        assert_eq!(
            c.push(b'X'),
            Step::Done(ReplyOutcome::Malformed(b"ACX".to_vec()))
        );
    }

    #[test]
    fn mismatch_on_first_byte_fails_fast() {
        let mut c = ReplyClassifier::new();
        assert_eq!(
            c.push(b'?'),
            Step::Done(ReplyOutcome::Malformed(b"?".to_vec()))
        );
        assert_eq!(c.received(), b"?");
    }

    #[test]
    fn trailing_bytes_after_ack_are_ignored() {
        assert_eq!(classify(b"ACKNACK"), ReplyOutcome::Acknowledged);
    }

    #[test]
    fn candidate_set_shrinks_monotonically() {
        let mut c = ReplyClassifier::new();
        assert_eq!(c.candidates().count(), 2);
        assert_eq!(c.push(b'N'), Step::NeedMore);
        assert_eq!(c.candidates().collect::<Vec<_>>(), vec![&b"NACK"[..]]);
        assert_eq!(c.push(b'A'), Step::NeedMore);
        assert_eq!(c.candidates().count(), 1);
    }

    #[test]
    fn max_len_is_longest_token() {
        assert_eq!(ReplyClassifier::new().max_len(), 4);
    }

    #[test]
    fn custom_tokens() {
        static TOKENS: &[ReplyToken] = &[
            ReplyToken {
                bytes: b"OK",
                outcome: ReplyOutcome::Acknowledged,
            },
            ReplyToken {
                bytes: b"ERR",
                outcome: ReplyOutcome::NegativeAcknowledged,
            },
        ];

        let mut c = ReplyClassifier::with_tokens(TOKENS);
        assert_eq!(c.push(b'E'), Step::NeedMore);
        assert_eq!(c.push(b'R'), Step::NeedMore);
        assert_eq!(
            c.push(b'R'),
            Step::Done(ReplyOutcome::NegativeAcknowledged)
        );

        let mut c = ReplyClassifier::with_tokens(TOKENS);
        assert_eq!(
            c.push(b'A'),
            Step::Done(ReplyOutcome::Malformed(b"A".to_vec()))
        );
    }

    #[test]
    fn outcome_display() {
        assert_eq!(ReplyOutcome::Acknowledged.to_string(), "ACK");
        assert_eq!(ReplyOutcome::TimedOut.to_string(), "TIMEOUT");
        assert_eq!(
            ReplyOutcome::Malformed(b"AX".to_vec()).to_string(),
            "malformed reply \"AX\""
        );
        assert!(ReplyOutcome::Acknowledged.is_ack());
        assert!(!ReplyOutcome::NegativeAcknowledged.is_ack());
    }
}
