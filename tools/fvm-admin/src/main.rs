//! fvm-admin: operator CLI for a running FVM server.
//!
//! Talks the same authenticated socket protocol as application clients, so
//! it needs a configured client id and secret. Intended for provisioning and
//! diagnosis, not for the hot path.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fvm_server::FvmClient;
use fvm_types::{ClientId, SignalId, Verdict};

#[derive(Parser, Debug)]
#[command(name = "fvm-admin")]
#[command(about = "Operator CLI for the Freshness Value Manager server")]
struct Args {
    /// Path to the server's Unix-domain socket
    #[arg(short, long, default_value = "/run/fvm/fvm.sock")]
    socket: String,

    /// Client id this tool authenticates as
    #[arg(short, long, default_value = "1")]
    client_id: u16,

    /// Hex-encoded envelope secret for the client id
    #[arg(short = 'k', long)]
    secret: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Counter status for one signal
    Status { signal_id: u32 },
    /// Issue the next freshness value for a Transmit-role signal
    Issue { signal_id: u32 },
    /// Validate a truncated freshness value against a Receive-role signal
    Validate { signal_id: u32, truncated: u64 },
    /// Reset a counter to a trusted full value (requires the admin token)
    Reset {
        signal_id: u32,
        new_value: u64,
        /// Hex-encoded reset authorization token
        #[arg(short, long)]
        token: String,
    },
    /// Manager-wide activity counters
    Diagnostics,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let secret = hex::decode(&args.secret).context("secret must be hex")?;
    let mut client = FvmClient::connect(&args.socket, ClientId(args.client_id), secret)
        .await
        .with_context(|| format!("connecting to {}", args.socket))?;

    match args.command {
        Command::Status { signal_id } => {
            let status = client.status(SignalId(signal_id)).await?;
            println!("signal:      {}", status.signal_id);
            println!("role:        {}", status.role);
            match status.sync_state {
                Some(state) => println!("sync state:  {state:?}"),
                None => println!("sync state:  n/a (transmit)"),
            }
            match status.last_value {
                Some(v) => println!("last value:  {v}"),
                None => println!("last value:  none"),
            }
        }
        Command::Issue { signal_id } => {
            let issued = client.issue(SignalId(signal_id)).await?;
            println!(
                "issued full={} truncated={}",
                issued.full_value, issued.truncated
            );
        }
        Command::Validate {
            signal_id,
            truncated,
        } => match client.validate(SignalId(signal_id), truncated).await? {
            Verdict::Accepted { full_value } => println!("accepted, full value {full_value}"),
            Verdict::Rejected { reason } => println!("rejected: {reason:?}"),
        },
        Command::Reset {
            signal_id,
            new_value,
            token,
        } => {
            let token = hex::decode(&token).context("token must be hex")?;
            client.reset(SignalId(signal_id), new_value, token).await?;
            println!("signal {signal_id} reset to {new_value}");
        }
        Command::Diagnostics => {
            let diag = client.diagnostics().await?;
            println!("issued:                {}", diag.issued);
            println!("accepted:              {}", diag.accepted);
            println!("rejected (stale):      {}", diag.rejected_stale);
            println!("rejected (out-of-win): {}", diag.rejected_out_of_window);
            println!("overflows:             {}", diag.overflows);
            println!("resets:                {}", diag.resets);
        }
    }

    Ok(())
}
