//! Synchronous request/reply exchanges with one sign.
//!
//! A [`SignSession`] owns the transport and the target board id. Each call
//! writes exactly one frame and then blocks on the link until the reply is
//! classified or the read timeout expires. Nothing is retried; a
//! [`ReplyOutcome`] other than `Acknowledged` is handed back to the caller.

use std::time::Duration;

use chrono::{DateTime, TimeZone};
use tokio::time::Instant;
use tracing::debug;

use ledsign_core::error::{Error, Result};
use ledsign_core::transport::Transport;

use crate::charset::encode_text;
use crate::commands::{self, CommandBody, PageFields};
use crate::protocol::{BoardId, encode_frame, encode_identity_query};
use crate::reply::{ReplyClassifier, ReplyOutcome, Step};

/// Default time to wait for each reply byte.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Drive a [`ReplyClassifier`] from `transport` until it reaches a verdict.
///
/// Reads one byte per `receive` call so that nothing past the reply is
/// consumed, and stops at the first byte that rules out every token.
pub async fn read_reply(transport: &mut dyn Transport, timeout: Duration) -> Result<ReplyOutcome> {
    let mut classifier = ReplyClassifier::new();
    let mut byte = [0u8; 1];

    loop {
        if transport.receive(&mut byte, timeout).await? == 0 {
            return Ok(classifier.timed_out());
        }
        if let Step::Done(outcome) = classifier.push(byte[0]) {
            return Ok(outcome);
        }
    }
}

/// An open connection to one board on the sign bus.
pub struct SignSession {
    transport: Box<dyn Transport>,
    board: BoardId,
    read_timeout: Duration,
}

impl SignSession {
    /// Create a session over an already-open transport.
    pub fn new(transport: Box<dyn Transport>, board: BoardId, read_timeout: Duration) -> Self {
        SignSession {
            transport,
            board,
            read_timeout,
        }
    }

    /// The board this session addresses.
    pub fn board(&self) -> BoardId {
        self.board
    }

    /// Per-byte read timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Change the per-byte read timeout for subsequent exchanges.
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    /// Frame `body`, send it, and classify the sign's reply.
    ///
    /// Transport failures are returned as errors; anything the sign does
    /// (or fails to do) is returned as a [`ReplyOutcome`].
    pub async fn exchange(&mut self, body: &CommandBody) -> Result<ReplyOutcome> {
        let frame = encode_frame(self.board, body);
        debug!(board = %self.board, frame = %String::from_utf8_lossy(&frame), "sending frame");
        self.transport.send(&frame).await?;

        let outcome = read_reply(self.transport.as_mut(), self.read_timeout).await?;
        debug!(board = %self.board, %outcome, "exchange complete");
        Ok(outcome)
    }

    /// Send the identity query and check that the board echoes its id.
    ///
    /// Both reply bytes must arrive within one read timeout, counted from
    /// the first read. Returns `Ok(true)` if they equal the board id in
    /// hex, `Ok(false)` for any other two bytes, and [`Error::LinkTimeout`]
    /// if the window closes first.
    pub async fn query_identity(&mut self) -> Result<bool> {
        let frame = encode_identity_query(self.board);
        debug!(board = %self.board, "sending identity query");
        self.transport.send(&frame).await?;

        let deadline = Instant::now() + self.read_timeout;
        let mut reply = [0u8; 2];
        let mut filled = 0;
        while filled < reply.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let n = if remaining.is_zero() {
                0
            } else {
                self.transport
                    .receive(&mut reply[filled..], remaining)
                    .await?
            };
            if n == 0 {
                debug!(board = %self.board, received = filled, "identity query timed out");
                return Err(Error::LinkTimeout);
            }
            filled += n;
        }

        let matches = reply.as_slice() == self.board.to_hex().as_bytes();
        debug!(
            board = %self.board,
            reply = %String::from_utf8_lossy(&reply),
            matches,
            "identity reply"
        );
        Ok(matches)
    }

    /// Transcode `text` and display it with the given page fields.
    pub async fn send_page(&mut self, fields: &PageFields, text: &str) -> Result<ReplyOutcome> {
        let message = encode_text(text)?;
        let body = commands::build_page_command(fields, &message)?;
        self.exchange(&body).await
    }

    /// Set the sign's clock to `time`.
    pub async fn set_clock<Tz: TimeZone>(&mut self, time: &DateTime<Tz>) -> Result<ReplyOutcome>
    where
        Tz::Offset: std::fmt::Display,
    {
        let body = commands::build_clock_command(time);
        self.exchange(&body).await
    }

    /// Make the sign cycle through `pages`.
    pub async fn set_schedule(&mut self, pages: &str) -> Result<ReplyOutcome> {
        let body = commands::build_schedule_command(pages);
        self.exchange(&body).await
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use ledsign_test_harness::MockTransport;

    fn session(mock: MockTransport, board: u8) -> SignSession {
        SignSession::new(Box::new(mock), BoardId::new(board), Duration::from_millis(50))
    }

    fn frame_for(board: u8, body: &CommandBody) -> Vec<u8> {
        encode_frame(BoardId::new(board), body)
    }

    // ---------------------------------------------------------------
    // exchange()
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn exchange_acknowledged() {
        let body = commands::build_schedule_command("AB");
        let mut mock = MockTransport::new();
        mock.expect(&frame_for(1, &body), b"ACK");

        let mut s = session(mock, 1);
        assert_eq!(s.exchange(&body).await.unwrap(), ReplyOutcome::Acknowledged);
    }

    #[tokio::test]
    async fn exchange_negative_ack() {
        let body = commands::build_schedule_command("A");
        let mut mock = MockTransport::new();
        mock.expect(&frame_for(7, &body), b"NACK");

        let mut s = session(mock, 7);
        assert_eq!(
            s.exchange(&body).await.unwrap(),
            ReplyOutcome::NegativeAcknowledged
        );
    }

    #[tokio::test]
    async fn exchange_silence_times_out() {
        let body = commands::build_schedule_command("A");
        let mut mock = MockTransport::new();
        mock.expect_silence(&frame_for(1, &body));

        let mut s = session(mock, 1);
        assert_eq!(s.exchange(&body).await.unwrap(), ReplyOutcome::TimedOut);
    }

    #[tokio::test]
    async fn exchange_malformed_stops_reading() {
        let body = commands::build_schedule_command("A");
        let mut mock = MockTransport::new();
        mock.expect(&frame_for(1, &body), b"ACXYZ");

        let mut s = session(mock, 1);
        assert_eq!(
            s.exchange(&body).await.unwrap(),
            ReplyOutcome::Malformed(b"ACX".to_vec())
        );
    }

    #[tokio::test]
    async fn read_reply_consumes_only_what_it_needs() {
        let mut mock = MockTransport::new();
        mock.expect(b"frame", b"ACXYZ");
        mock.send(b"frame").await.unwrap();

        let outcome = read_reply(&mut mock, Duration::ZERO).await.unwrap();
        assert_eq!(outcome, ReplyOutcome::Malformed(b"ACX".to_vec()));
        assert_eq!(mock.receive_calls(), 3);
        assert_eq!(mock.unread_response_bytes(), 2);
    }

    #[tokio::test]
    async fn read_reply_leaves_bytes_after_ack() {
        let mut mock = MockTransport::new();
        mock.expect(b"frame", b"ACKNACK");
        mock.send(b"frame").await.unwrap();

        let outcome = read_reply(&mut mock, Duration::ZERO).await.unwrap();
        assert_eq!(outcome, ReplyOutcome::Acknowledged);
        assert_eq!(mock.unread_response_bytes(), 4);
    }

    #[tokio::test]
    async fn read_reply_cut_off_is_timeout() {
        let mut mock = MockTransport::new();
        mock.expect(b"frame", b"NA");
        mock.send(b"frame").await.unwrap();

        let outcome = read_reply(&mut mock, Duration::ZERO).await.unwrap();
        assert_eq!(outcome, ReplyOutcome::TimedOut);
        assert_eq!(mock.receive_calls(), 3);
    }

    #[tokio::test]
    async fn exchange_propagates_send_failure() {
        let body = commands::build_schedule_command("A");
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let mut s = session(mock, 1);
        assert!(matches!(s.exchange(&body).await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn exchanges_run_in_order() {
        let first = commands::build_schedule_command("AB");
        let second = commands::build_page_command(&PageFields::default(), b"HI").unwrap();
        let mut mock = MockTransport::new();
        mock.expect(&frame_for(2, &first), b"ACK");
        mock.expect(&frame_for(2, &second), b"NACK");

        let mut s = session(mock, 2);
        assert_eq!(s.exchange(&first).await.unwrap(), ReplyOutcome::Acknowledged);
        assert_eq!(
            s.exchange(&second).await.unwrap(),
            ReplyOutcome::NegativeAcknowledged
        );
    }

    // ---------------------------------------------------------------
    // Convenience commands
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn send_page_transcodes_and_frames() {
        let message = encode_text("Hi {CB}<you>").unwrap();
        let body = commands::build_page_command(&PageFields::default(), &message).unwrap();
        assert!(body.as_bytes().ends_with(b"Hi <CB><UBC>you<UBE>"));

        let mut mock = MockTransport::new();
        mock.expect(&frame_for(1, &body), b"ACK");

        let mut s = session(mock, 1);
        let outcome = s
            .send_page(&PageFields::default(), "Hi {CB}<you>")
            .await
            .unwrap();
        assert!(outcome.is_ack());
    }

    #[tokio::test]
    async fn send_page_rejects_invalid_fields_before_sending() {
        let mock = MockTransport::new();
        let mut s = session(mock, 1);
        let fields = PageFields {
            colour: 'O',
            ..PageFields::default()
        };
        let result = s.send_page(&fields, "x").await;
        assert!(matches!(
            result,
            Err(Error::InvalidField { field: "colour", .. })
        ));
    }

    #[tokio::test]
    async fn send_page_rejects_unsupported_text() {
        let mut s = session(MockTransport::new(), 1);
        let result = s.send_page(&PageFields::default(), "\u{263A}").await;
        assert!(matches!(result, Err(Error::UnsupportedCharacter(_))));
    }

    #[tokio::test]
    async fn set_clock_sends_clock_frame() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let t = tz.with_ymd_and_hms(2024, 3, 6, 7, 8, 9).unwrap();
        let body = commands::build_clock_command(&t);

        let mut mock = MockTransport::new();
        mock.expect(&frame_for(3, &body), b"ACK");

        let mut s = session(mock, 3);
        assert!(s.set_clock(&t).await.unwrap().is_ack());
    }

    #[tokio::test]
    async fn set_schedule_sends_schedule_frame() {
        let body = commands::build_schedule_command("ABC");
        let mut mock = MockTransport::new();
        mock.expect(&frame_for(1, &body), b"ACK");

        let mut s = session(mock, 1);
        assert!(s.set_schedule("ABC").await.unwrap().is_ack());
    }

    // ---------------------------------------------------------------
    // query_identity()
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn identity_matches() {
        let mut mock = MockTransport::new();
        mock.expect(b"<ID><2A><E>", b"2A");

        let mut s = session(mock, 0x2A);
        assert!(s.query_identity().await.unwrap());
    }

    #[tokio::test]
    async fn identity_mismatch() {
        let mut mock = MockTransport::new();
        mock.expect(b"<ID><01><E>", b"02");

        let mut s = session(mock, 1);
        assert!(!s.query_identity().await.unwrap());
    }

    #[tokio::test]
    async fn identity_lowercase_reply_does_not_match() {
        let mut mock = MockTransport::new();
        mock.expect(b"<ID><AB><E>", b"ab");

        let mut s = session(mock, 0xAB);
        assert!(!s.query_identity().await.unwrap());
    }

    #[tokio::test]
    async fn identity_single_byte_is_link_timeout() {
        let mut mock = MockTransport::new();
        mock.expect(b"<ID><01><E>", b"0");

        let mut s = session(mock, 1);
        assert!(matches!(s.query_identity().await, Err(Error::LinkTimeout)));
    }

    #[tokio::test]
    async fn identity_silence_is_link_timeout() {
        let mut mock = MockTransport::new();
        mock.expect_silence(b"<ID><01><E>");

        let mut s = session(mock, 1);
        assert!(matches!(s.query_identity().await, Err(Error::LinkTimeout)));
    }

    #[tokio::test]
    async fn identity_split_reply_within_window() {
        let mut mock = MockTransport::new();
        mock.expect(b"<ID><01><E>", b"01");
        mock.set_byte_delay(Duration::from_millis(10));

        let mut s = SignSession::new(Box::new(mock), BoardId::new(1), Duration::from_millis(500));
        assert!(s.query_identity().await.unwrap());
    }

    #[tokio::test]
    async fn identity_window_covers_both_bytes() {
        // Each byte alone fits the timeout, both together do not.
        let mut mock = MockTransport::new();
        mock.expect(b"<ID><01><E>", b"01");
        mock.set_byte_delay(Duration::from_millis(80));

        let mut s = SignSession::new(Box::new(mock), BoardId::new(1), Duration::from_millis(100));
        assert!(matches!(s.query_identity().await, Err(Error::LinkTimeout)));
    }

    #[tokio::test]
    async fn close_disconnects_transport() {
        let mut s = session(MockTransport::new(), 1);
        s.close().await.unwrap();
        let body = commands::build_schedule_command("A");
        assert!(matches!(s.exchange(&body).await, Err(Error::NotConnected)));
    }

    #[test]
    fn read_timeout_is_adjustable() {
        let mut s = session(MockTransport::new(), 1);
        assert_eq!(s.read_timeout(), Duration::from_millis(50));
        s.set_read_timeout(DEFAULT_READ_TIMEOUT);
        assert_eq!(s.read_timeout(), Duration::from_secs(1));
        assert_eq!(s.board(), BoardId::new(1));
    }
}
