use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod endpoints;
pub mod health;
pub mod init;
pub mod process;
pub mod render;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Initialize the client store
    Init {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Run the API server and web UI
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Print the endpoints the app would use right now
    Endpoints {},
    /// Check the calendar assistant backend
    Health {},
    /// Extract events from a calendar image and add them to a calendar
    Process {
        /// Image file to upload
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read a pasted image from standard input instead of a file
        #[arg(long, action, default_value = "false", conflicts_with = "file")]
        stdin: bool,

        /// Media type of the image read from standard input
        #[arg(long, default_value = "image/png")]
        media_type: String,

        /// Calendar to add events to, overrides CALSNAP_CALENDAR_ID
        #[arg(long)]
        calendar_id: Option<String>,

        /// Add every extracted event without reviewing
        #[arg(long, short, action, default_value = "false")]
        yes: bool,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Log to stderr so command output stays clean
pub(crate) fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Init { db }) => {
            init::run(db).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Endpoints {}) => {
            endpoints::run().await?;
        }
        Some(Command::Health {}) => {
            health::run().await?;
        }
        Some(Command::Process {
            file,
            stdin,
            media_type,
            calendar_id,
            yes,
        }) => {
            process::run(file, stdin, &media_type, calendar_id, yes).await?;
        }
        None => {}
    }

    Ok(())
}
