// ledsign -- send messages, schedules and clock updates to an AM03127 LED
// sign over a serial port.
//
// Usage:
//   ledsign --message Hello world
//   echo "Hello" | ledsign --port /dev/ttyUSB1 --signid 2 --message
//   ledsign --page B --col C --lead A --message "{CB}red text"
//   ledsign --schedule AB --settime
//   ledsign --set-id --signid 5
//   ledsign --mock -v --message test

use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use ledsign_am03127::charset::encode_text;
use ledsign_am03127::commands::{
    CommandBody, PageFields, build_clock_command_now, build_page_command, build_schedule_command,
};
use ledsign_am03127::SignBuilder;
use ledsign_am03127::protocol::{BoardId, encode_frame, encode_identity_query};
use ledsign_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Send messages to an AM03127 LED sign.
#[derive(Parser, Debug)]
#[command(name = "ledsign", version, about)]
struct Cli {
    /// Serial port.
    #[arg(short = 'p', long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Baud rate.
    #[arg(short = 'b', long, default_value_t = 9600)]
    baud: u32,

    /// Sign id (board address on the bus, 0-255).
    #[arg(short = 's', long, default_value_t = 1)]
    signid: i64,

    /// Page (A-Z).
    #[arg(long, default_value_t = 'A')]
    page: char,

    /// Lead (appear) effect (A-S).
    #[arg(long, default_value_t = 'E')]
    lead: char,

    /// Lag (disappear) effect (A-S).
    #[arg(long, default_value_t = 'E')]
    lag: char,

    /// Display speed and blink/song effect: A-E, Q-U, a-e, q-u.
    #[arg(long, default_value_t = 'A')]
    disp: char,

    /// Line (1-8).
    #[arg(long, default_value_t = 1)]
    line: u8,

    /// Wait S seconds (0-25, 0 = half a second).
    #[arg(long, value_name = "S", default_value_t = 1)]
    wait: u8,

    /// Colour of text.
    #[arg(long, value_name = "COLOUR", default_value_t = 'A')]
    col: char,

    /// Font of text.
    #[arg(long, value_name = "FONTSTYLE", default_value_t = 'A')]
    font: char,

    /// Schedule: the pages to cycle through (e.g. AB).
    #[arg(long)]
    schedule: Option<String>,

    /// Set the sign's clock to the local time.
    #[arg(long)]
    settime: bool,

    /// Send a message (from the arguments, or stdin if none are given).
    #[arg(long)]
    message: bool,

    /// Assign the sign id to the board and check that it answers.
    #[arg(long)]
    set_id: bool,

    /// Milliseconds to wait for each reply byte.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Use a mock transport that acknowledges everything instead of a
    /// serial port.
    #[arg(long)]
    mock: bool,

    /// Be verbose.
    #[arg(short, long)]
    verbose: bool,

    /// Message text.
    text: Vec<String>,
}

impl Cli {
    fn page_fields(&self) -> PageFields {
        PageFields {
            line: self.line,
            page: self.page,
            lead: self.lead,
            display: self.disp,
            wait: self.wait,
            lag: self.lag,
            colour: self.col,
            font: self.font,
        }
    }

    fn has_action(&self) -> bool {
        self.schedule.is_some() || self.settime || self.message || self.set_id
    }
}

// ---------------------------------------------------------------------------
// Packet assembly
// ---------------------------------------------------------------------------

/// Build the command bodies requested on the command line, in send order:
/// schedule, clock, message.
fn build_packets(cli: &Cli, text: Option<&str>) -> Result<Vec<(&'static str, CommandBody)>> {
    let mut packets = Vec::new();

    if let Some(pages) = &cli.schedule {
        info!(pages = %pages, "Setting schedule");
        packets.push(("schedule", build_schedule_command(pages)));
    }

    if cli.settime {
        info!("Setting time");
        packets.push(("time", build_clock_command_now()));
    }

    if cli.message {
        let text = text.context("--message needs text")?;
        let encoded = encode_text(text).context("message cannot be shown on the sign")?;
        debug!(message = %String::from_utf8_lossy(&encoded), "Encoded message");
        let body = build_page_command(&cli.page_fields(), &encoded)?;
        info!("Setting message");
        packets.push(("message", body));
    }

    Ok(packets)
}

/// Message text from the positional arguments, or stdin when there are none.
fn message_text(cli: &Cli) -> Result<Option<String>> {
    if !cli.message {
        return Ok(None);
    }
    if !cli.text.is_empty() {
        return Ok(Some(cli.text.join(" ")));
    }
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read message from stdin")?;
    Ok(Some(input.trim().to_string()))
}

/// A mock sign that answers every packet with `ACK` and echoes its id.
fn mock_transport(cli: &Cli, board: BoardId, packets: &[(&str, CommandBody)]) -> MockTransport {
    let mut mock = MockTransport::new();
    if cli.set_id {
        mock.expect(&encode_identity_query(board), board.to_hex().as_bytes());
    }
    for (_, body) in packets {
        mock.expect(&encode_frame(board, body), b"ACK");
    }
    mock
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let board = BoardId::try_from(cli.signid)?;

    if !cli.has_action() {
        warn!("nothing to do: pass --message, --schedule, --settime or --set-id");
        return Ok(());
    }

    let text = message_text(&cli)?;
    let packets = build_packets(&cli, text.as_deref())?;

    let builder = SignBuilder::new()
        .serial_port(&cli.port)
        .baud_rate(cli.baud)
        .board_id(board.value())
        .read_timeout(Duration::from_millis(cli.timeout_ms));

    let mut sign = if cli.mock {
        builder.build_with_transport(Box::new(mock_transport(&cli, board, &packets)))?
    } else {
        builder
            .build()
            .await
            .with_context(|| format!("failed to open {}", cli.port))?
    };

    if cli.set_id {
        if !sign.query_identity().await? {
            bail!("board did not confirm id {board}");
        }
        info!(board = %board, "Sign id confirmed");
    }

    for (label, body) in &packets {
        let outcome = sign.exchange(body).await?;
        info!("{body} --> {outcome}");
        if !outcome.is_ack() {
            error!(packet = *label, %outcome, "Sign did not acknowledge");
            sign.close().await.ok();
            bail!("could not send {label}: {outcome}");
        }
    }

    sign.close().await?;
    Ok(())
}
