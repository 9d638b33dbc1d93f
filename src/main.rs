//! Resolve one video identifier and print the selected audio stream.

use std::process::ExitCode;

use audio_resolver::{AudioResolver, ResolverConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "audio-resolver")]
#[command(about = "Find a playable audio stream for a video identifier")]
struct Cli {
    /// Video identifier (e.g. dQw4w9WgXcQ)
    video_id: String,

    /// Kind of stream to resolve
    #[arg(long, default_value = "audio")]
    data_type: String,

    /// SOCKS5/HTTP proxy URL for all sources
    #[arg(long)]
    proxy: Option<String>,

    /// Path to the yt-dlp binary
    #[arg(long)]
    ytdlp_path: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ResolverConfig::default()
        .with_proxy(cli.proxy)
        .with_ytdlp_path(cli.ytdlp_path);

    let resolver = match AudioResolver::new(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match resolver.resolve(&cli.video_id, &cli.data_type).await {
        Ok(format) => match serde_json::to_string_pretty(&format) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to encode result: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
