// Mirror iteration for federated sources
//
// Mirrors are tried one at a time in declared order. Parallel fan-out would
// multiply load on volunteer-run instances.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use super::errors::SourceError;
use super::format_selector::select_best_audio;
use super::models::{AudioFormat, RawStreamDescriptor};

/// Try each mirror in turn and return the first selected audio format.
///
/// `fetch` returns the (already source-normalized) descriptor list for one
/// mirror. Timeouts and fetch errors are remembered and iteration continues;
/// a mirror whose descriptors select to nothing is skipped without replacing
/// the remembered error.
pub async fn try_mirrors<F, Fut>(
    mirrors: &[String],
    per_call_timeout: Duration,
    mut fetch: F,
) -> Result<AudioFormat, SourceError>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<Vec<RawStreamDescriptor>, SourceError>>,
{
    let mut last_error: Option<SourceError> = None;

    for mirror in mirrors {
        debug!(mirror = %mirror, "trying mirror");

        let descriptors = match timeout(per_call_timeout, fetch(mirror.as_str())).await {
            Ok(Ok(descriptors)) => descriptors,
            Ok(Err(e)) => {
                debug!(mirror = %mirror, error = %e, "mirror failed");
                last_error = Some(e);
                continue;
            }
            Err(_) => {
                debug!(mirror = %mirror, timeout_secs = per_call_timeout.as_secs(), "mirror timed out");
                last_error = Some(SourceError::Timeout(per_call_timeout));
                continue;
            }
        };

        match select_best_audio(&descriptors) {
            Some(format) => {
                debug!(mirror = %mirror, bitrate = format.bitrate, "mirror returned audio");
                return Ok(format);
            }
            None => {
                debug!(mirror = %mirror, "mirror returned no audio formats");
            }
        }
    }

    Err(last_error.unwrap_or(SourceError::MirrorsExhausted(mirrors.len())))
}
