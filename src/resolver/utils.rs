// Helper functions shared by the providers

use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::errors::SourceError;
use super::models::RawStreamDescriptor;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7";
pub const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

/// Max URL length kept in log lines
const LOG_URL_LIMIT: usize = 100;

/// Watch page URL for a video identifier
pub fn watch_url(video_id: &str) -> String {
    format!("{}/watch?v={}", YOUTUBE_ORIGIN, video_id)
}

/// Build an HTTP client with the browser user agent and optional proxy
pub fn build_http_client(
    proxy: Option<&str>,
    request_timeout: Duration,
) -> Result<reqwest::Client, SourceError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(request_timeout);

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| SourceError::Transport(format!("Invalid proxy URL {}: {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| SourceError::Transport(format!("Failed to build HTTP client: {}", e)))
}

/// GET a URL and decode the body as untyped JSON
pub async fn get_json(
    client: &reqwest::Client,
    url: &str,
    request_timeout: Duration,
) -> Result<Value, SourceError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(request_timeout)
        .send()
        .await
        .map_err(|e| map_request_error(e, request_timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: truncate_url(url),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| map_request_error(e, request_timeout))?;

    serde_json::from_slice(&body)
        .map_err(|e| SourceError::InvalidResponse(format!("Invalid JSON: {}", e)))
}

fn map_request_error(e: reqwest::Error, request_timeout: Duration) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(request_timeout)
    } else {
        SourceError::from(e)
    }
}

/// Run command with timeout, killing it when the deadline passes
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    limit: Duration,
) -> Result<std::process::Output, SourceError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SourceError::spawn_failure(program, &e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| SourceError::Transport(format!("Failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| SourceError::Transport(format!("Failed to capture stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(limit, child.wait()).await {
        Ok(status_res) => {
            let status = status_res
                .map_err(|e| SourceError::Transport(format!("Failed to wait for {}: {}", program, e)))?;
            let stdout = join_pipe(stdout_task).await?;
            let stderr = join_pipe(stderr_task).await?;
            Ok(std::process::Output { status, stdout, stderr })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(SourceError::Timeout(limit))
        }
    }
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, SourceError> {
    task.await
        .map_err(|e| SourceError::Transport(format!("pipe task failed: {}", e)))?
        .map_err(|e| SourceError::Transport(format!("Failed to read pipe: {}", e)))
}

/// Shorten a URL for log output
pub fn truncate_url(url: &str) -> String {
    if url.chars().count() <= LOG_URL_LIMIT {
        return url.to_string();
    }
    let head: String = url.chars().take(LOG_URL_LIMIT).collect();
    format!("{}...", head)
}

/// Read a bitrate that may be a number, a float or a numeric string.
/// Anything else counts as 0.
pub fn bitrate_of(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn str_field(entry: &Value, key: &str) -> Option<String> {
    entry[key].as_str().map(|s| s.to_string())
}

/// Decode a JSON stream list into descriptors.
///
/// `type_key` names the field holding the mime/type indicator, which differs
/// per source (`mimeType` vs `type`). A missing or non-array value yields an
/// empty list.
pub fn descriptors_from_json(list: &Value, type_key: &str) -> Vec<RawStreamDescriptor> {
    let Some(entries) = list.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| RawStreamDescriptor {
            url: str_field(entry, "url"),
            mime_type: str_field(entry, type_key),
            bitrate: bitrate_of(&entry["bitrate"]),
            container: str_field(entry, "container"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bitrate_shapes() {
        assert_eq!(bitrate_of(&json!(128000)), 128000);
        assert_eq!(bitrate_of(&json!(95.7)), 95);
        assert_eq!(bitrate_of(&json!("160000")), 160000);
        assert_eq!(bitrate_of(&json!("fast")), 0);
        assert_eq!(bitrate_of(&json!(null)), 0);
        assert_eq!(bitrate_of(&json!(-5)), 0);
    }

    #[test]
    fn test_descriptors_from_non_array() {
        assert!(descriptors_from_json(&json!(null), "type").is_empty());
        assert!(descriptors_from_json(&json!({"url": "x"}), "type").is_empty());
    }

    #[test]
    fn test_descriptors_use_type_key() {
        let list = json!([
            {"url": "https://a", "type": "audio/webm; codecs=\"opus\"", "bitrate": "130000"},
            "garbage",
            {"url": "https://b", "mimeType": "audio/mp4"}
        ]);

        let descriptors = descriptors_from_json(&list, "type");
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].bitrate, 130000);
        assert!(descriptors[0].is_audio());
        assert_eq!(descriptors[1].mime_type, None);
        assert_eq!(descriptors[1].bitrate, 0);
    }

    #[test]
    fn test_truncate_url() {
        let long = format!("https://cdn.example/{}", "a".repeat(200));
        let short = truncate_url(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), LOG_URL_LIMIT + 3);
        assert_eq!(truncate_url("https://a"), "https://a");
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = build_http_client(None, Duration::from_secs(2)).unwrap();
        let err = get_json(&client, &format!("http://127.0.0.1:{}/streams/x", port), Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Transport(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let err = run_output_with_timeout("/nonexistent/bin/yt-dlp", Vec::new(), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::ToolNotFound(_)));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("dQw4w9WgXcQ"), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
