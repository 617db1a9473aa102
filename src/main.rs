//! `threadfold` command line.
//!
//! - `threadfold convert conversations.json [-o out.json]` - one-shot file conversion
//!   (`-` reads stdin / writes stdout)
//! - `threadfold serve [--port 4860]` - HTTP conversion endpoint

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use threadfold_rs::config::{ServerConfig, TransformConfig, DEFAULT_OUTPUT_FILE};
use threadfold_rs::{convert, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "threadfold", version)]
#[command(about = "Flatten chat-history exports into thread and message records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an extracted conversations.json
    Convert {
        /// Export file, or `-` for stdin
        input: PathBuf,
        /// Output file, or `-` for stdout
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
        /// Sort each thread's messages by creation time
        #[arg(long)]
        chronological: bool,
    },
    /// Serve the conversion endpoint over HTTP
    Serve {
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
        /// Default for requests without a `chronological` query flag
        #[arg(long)]
        chronological: bool,
    },
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn run_convert(input: &Path, output: &Path, chronological: bool) -> Result<()> {
    let config = TransformConfig {
        chronological,
        ..TransformConfig::default()
    };

    match (is_stdio(input), is_stdio(output)) {
        (false, false) => {
            convert::convert_file(input, output, &config)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
        }
        (true, true) => {
            convert::convert_stream(io::stdin().lock(), io::stdout().lock(), &config)
                .context("Failed to convert stdin")?;
        }
        (true, false) => {
            // Parse before creating the output file
            let mut buf = Vec::new();
            convert::convert_stream(io::stdin().lock(), &mut buf, &config).context("Failed to convert stdin")?;
            std::fs::write(output, buf).with_context(|| format!("Failed to write {}", output.display()))?;
        }
        (false, true) => {
            let file = std::fs::File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
            convert::convert_stream(file, io::stdout().lock(), &config)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `-o -` output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("threadfold_rs=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            chronological,
        } => {
            // The core is synchronous; run it on the blocking pool
            tokio::task::spawn_blocking(move || run_convert(&input, &output, chronological))
                .await
                .context("Conversion task panicked")??;
        }
        Commands::Serve { port, chronological } => {
            let mut config = ServerConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            config.chronological |= chronological;
            server::serve(config).await.context("Server error")?;
        }
    }

    Ok(())
}
