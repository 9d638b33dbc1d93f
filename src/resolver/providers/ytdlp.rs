// yt-dlp backed metadata library
//
// Runs `yt-dlp --dump-json` and decodes its `formats` array.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use super::library::{MediaFormat, MetadataLibrary};
use crate::resolver::errors::SourceError;
use crate::resolver::utils::run_output_with_timeout;

const COMMON_PATHS: [&str; 3] = [
    "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
    "/usr/local/bin/yt-dlp",
    "/usr/bin/yt-dlp",
];

/// Discovered once per process
static DISCOVERED_PATH: OnceLock<String> = OnceLock::new();

/// Metadata library using the yt-dlp binary
pub struct YtDlpLibrary {
    /// Explicit binary; `None` means discover on first use
    ytdlp_path: Option<String>,
    proxy: Option<String>,
    timeout: Duration,
}

impl YtDlpLibrary {
    pub fn new(ytdlp_path: Option<String>, proxy: Option<String>, timeout: Duration) -> Self {
        Self {
            ytdlp_path,
            proxy,
            timeout,
        }
    }

    /// Binary to run: the configured path, or the discovered one
    async fn program(&self) -> String {
        if let Some(path) = &self.ytdlp_path {
            return path.clone();
        }

        if let Some(path) = DISCOVERED_PATH.get() {
            return path.clone();
        }

        let found = Self::find_ytdlp().await;
        DISCOVERED_PATH.get_or_init(|| found).clone()
    }

    /// Find yt-dlp binary
    async fn find_ytdlp() -> String {
        for path in COMMON_PATHS {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return path.to_string();
            }
        }

        if let Ok(output) = TokioCommand::new("which").arg("yt-dlp").output().await {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout);
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Build command arguments
    fn build_args(&self, url: &str, headers: &[(&'static str, &'static str)]) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.timeout.as_secs().max(1).to_string(),
        ];

        for (name, value) in headers {
            if name.eq_ignore_ascii_case("User-Agent") {
                args.push("--user-agent".to_string());
                args.push(value.to_string());
            } else {
                args.push("--add-header".to_string());
                args.push(format!("{}:{}", name, value));
            }
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(url.to_string());
        args
    }

    fn parse_formats(stdout: &[u8]) -> Result<Vec<MediaFormat>, SourceError> {
        let json: Value = serde_json::from_slice(stdout)
            .map_err(|e| SourceError::InvalidResponse(format!("Invalid JSON: {}", e)))?;

        let formats_array = json["formats"].as_array().ok_or_else(|| {
            SourceError::InvalidResponse("No formats array in JSON".to_string())
        })?;

        Ok(formats_array
            .iter()
            .map(|f| MediaFormat {
                format_id: f["format_id"].as_str().unwrap_or("").to_string(),
                ext: f["ext"].as_str().unwrap_or("").to_string(),
                url: f["url"].as_str().map(|s| s.to_string()),
                vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
                acodec: f["acodec"].as_str().map(|s| s.to_string()),
                abr: f["abr"].as_f64(),
                tbr: f["tbr"].as_f64(),
            })
            .collect())
    }
}

#[async_trait]
impl MetadataLibrary for YtDlpLibrary {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch_formats(
        &self,
        watch_url: &str,
        headers: &[(&'static str, &'static str)],
    ) -> Result<Vec<MediaFormat>, SourceError> {
        let program = self.program().await;
        let args = self.build_args(watch_url, headers);
        debug!(program = %program, "running metadata tool");

        let output = run_output_with_timeout(&program, args, self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("yt-dlp failed with exit code: {:?}", output.status.code())
            } else {
                stderr.trim().to_string()
            };
            return Err(SourceError::from(message));
        }

        Self::parse_formats(&output.stdout)
    }
}
