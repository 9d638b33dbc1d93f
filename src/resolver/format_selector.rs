// FormatSelector - audio-only filtering and bitrate-based selection
//
// Every provider normalizes its own response shape into RawStreamDescriptor
// first; the selection policy here is shared.

use super::models::{AudioFormat, RawStreamDescriptor};

/// Audio format selection
pub struct FormatSelector;

impl FormatSelector {
    /// Keep only descriptors tagged as audio that carry a usable URL
    pub fn audio_only(descriptors: &[RawStreamDescriptor]) -> Vec<&RawStreamDescriptor> {
        descriptors
            .iter()
            .filter(|d| d.is_audio() && d.usable_url().is_some())
            .collect()
    }

    /// Highest bitrate descriptor; the earliest one wins a tie
    pub fn highest_bitrate<'a>(
        descriptors: &[&'a RawStreamDescriptor],
    ) -> Option<&'a RawStreamDescriptor> {
        let (first, rest) = descriptors.split_first()?;

        // Strict `>` keeps the earlier entry on equal bitrates
        let best = rest
            .iter()
            .fold(*first, |best, d| if d.bitrate > best.bitrate { *d } else { best });

        Some(best)
    }
}

/// Pick the best audio stream from a raw descriptor list.
/// `None` means the source had nothing usable, not that it failed.
pub fn select_best_audio(descriptors: &[RawStreamDescriptor]) -> Option<AudioFormat> {
    let audio = FormatSelector::audio_only(descriptors);
    FormatSelector::highest_bitrate(&audio).and_then(|d| d.clone().into_audio_format())
}
