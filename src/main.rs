//! Entry point for `arq-over-udp`.
//!
//! Parses CLI arguments and dispatches into either **send** or **receive**
//! mode.  All protocol work is delegated to library modules; `main.rs` owns
//! only process setup (logging, argument parsing, stdin plumbing).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use arq_over_udp::{
    DeliveryError, Receiver, ReceiverConfig, Sender, SenderConfig, Socket, UdpChannel,
};

/// Stop-and-wait reliable text messaging over lossy UDP.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Read lines from stdin and deliver each one reliably.
    Send {
        /// Receiver address (e.g. 127.0.0.1:50000).
        #[arg(short, long, default_value = "127.0.0.1:50000")]
        target: SocketAddr,
        /// Per-attempt reply deadline, in milliseconds.
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
        /// Total transmission budget per message.
        #[arg(long, default_value_t = 5)]
        max_attempts: u32,
    },
    /// Listen for frames and acknowledge them, with simulated corruption.
    Receive {
        /// Local address to bind.
        #[arg(short, long, default_value = "127.0.0.1:50000")]
        bind: SocketAddr,
        /// Probability in [0, 1) that an inbound datagram has one bit flipped.
        #[arg(long, default_value_t = 0.2)]
        error_prob: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    match cli.mode {
        Mode::Send {
            target,
            timeout_ms,
            max_attempts,
        } => run_sender(target, timeout_ms, max_attempts).await,
        Mode::Receive { bind, error_prob } => run_receiver(bind, error_prob).await,
    }
}

async fn run_sender(target: SocketAddr, timeout_ms: u64, max_attempts: u32) -> anyhow::Result<()> {
    let local: SocketAddr = "0.0.0.0:0".parse().context("parsing wildcard address")?;
    let channel = UdpChannel::bind(local, target)
        .await
        .context("binding sender socket")?;
    let config = SenderConfig {
        timeout: Duration::from_millis(timeout_ms),
        max_attempts,
    };
    let mut sender = Sender::new(channel, config);

    println!("Sending to {target}. Type a message, or an empty line to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.is_empty() {
            break;
        }
        match sender.deliver(&line).await {
            Ok(()) => println!("delivered (next seq = {})", sender.sequence()),
            Err(e @ DeliveryError::RetriesExhausted { .. })
            | Err(e @ DeliveryError::Frame(_)) => {
                // Per-message failure only; the session stays usable.
                println!("not delivered: {e}");
            }
            Err(DeliveryError::Io(e)) => return Err(e).context("sender channel"),
        }
    }

    Ok(())
}

async fn run_receiver(bind: SocketAddr, error_prob: f64) -> anyhow::Result<()> {
    let socket = Socket::bind(bind).await.context("binding receiver socket")?;
    let mut receiver = Receiver::new(ReceiverConfig {
        corruption_probability: error_prob,
    })
    .context("configuring fault injector")?;

    receiver.serve(&socket).await.context("receiver loop")?;
    Ok(())
}
