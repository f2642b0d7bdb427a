//! Lazy stream location.
//!
//! Upstream stream URLs are short-lived, so nothing here runs at
//! resolution time; the host asks for a descriptor when playback
//! actually starts, possibly long after the track entered its queue.

use std::sync::Arc;

use crate::{
    error::{Error, Result},
    http,
    protocol::youtube::{StreamFormat, StreamingData},
    reference::Catalog,
    session::SessionStore,
    youtube::InnertubeStrategy,
};

/// Everything the host playback pipeline needs to open a stream.
#[derive(Clone, Debug)]
pub struct StreamDescriptor {
    pub url: String,
    /// Full MIME type as reported upstream, codec parameters included.
    pub content_type: String,
    /// Bits per second, when reported.
    pub bitrate: Option<u64>,
}

/// Resolves a video id into a fresh stream URL on demand.
///
/// Playback is audio-centric, so an audio-only variant is preferred;
/// a muxed audio/video variant is the fallback. Ciphered variants
/// carry no plain URL and are never selected.
pub struct StreamLocator {
    innertube: InnertubeStrategy,
    sessions: Arc<SessionStore>,
}

impl StreamLocator {
    #[must_use]
    pub fn new(http_client: Arc<http::Client>, sessions: Arc<SessionStore>) -> Self {
        Self {
            innertube: InnertubeStrategy::new(http_client, Arc::clone(&sessions)),
            sessions,
        }
    }

    /// Fetches a stream descriptor, forcing one credential refresh and
    /// one retry when the upstream throttles the call. Any other
    /// failure is terminal for this playback attempt.
    pub async fn locate(&self, video_id: &str) -> Result<StreamDescriptor> {
        match self.fetch(video_id).await {
            Err(error) if error.is_transient() => {
                warn!("stream fetch for {video_id} throttled, refreshing session: {error}");
                self.sessions.force_refresh(Catalog::YouTube).await?;
                self.fetch(video_id).await
            }
            other => other,
        }
    }

    async fn fetch(&self, video_id: &str) -> Result<StreamDescriptor> {
        let response = self.innertube.player_response(video_id).await?;
        let streaming = response
            .streaming_data
            .ok_or_else(|| Error::unavailable(format!("no streaming data for {video_id}")))?;

        select_format(&streaming)
            .map(|format| StreamDescriptor {
                // Selection guarantees the URL is present.
                url: format.url.clone().unwrap_or_default(),
                content_type: format.mime_type.clone(),
                bitrate: format.bitrate,
            })
            .ok_or_else(|| Error::unavailable(format!("no playable format for {video_id}")))
    }
}

fn select_format(streaming: &StreamingData) -> Option<&StreamFormat> {
    streaming
        .adaptive_formats
        .iter()
        .find(|format| format.is_audio_only() && format.url.is_some())
        .or_else(|| streaming.formats.iter().find(|format| format.url.is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(url: Option<&str>, mime_type: &str, bitrate: u64) -> StreamFormat {
        StreamFormat {
            url: url.map(str::to_owned),
            mime_type: mime_type.to_owned(),
            bitrate: Some(bitrate),
        }
    }

    #[test]
    fn prefers_audio_only_variant() {
        let streaming = StreamingData {
            adaptive_formats: vec![
                format(Some("https://example.com/v"), "video/mp4", 1_000_000),
                format(Some("https://example.com/a"), "audio/webm; codecs=\"opus\"", 160_000),
            ],
            formats: vec![format(Some("https://example.com/m"), "video/mp4", 500_000)],
        };

        let selected = select_format(&streaming).unwrap();
        assert_eq!(selected.url.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn falls_back_to_first_muxed_variant() {
        let streaming = StreamingData {
            adaptive_formats: vec![format(Some("https://example.com/v"), "video/mp4", 1_000_000)],
            formats: vec![
                format(Some("https://example.com/m1"), "video/mp4", 500_000),
                format(Some("https://example.com/m2"), "video/3gpp", 100_000),
            ],
        };

        let selected = select_format(&streaming).unwrap();
        assert_eq!(selected.url.as_deref(), Some("https://example.com/m1"));
    }

    #[test]
    fn skips_ciphered_variants() {
        let streaming = StreamingData {
            adaptive_formats: vec![format(None, "audio/webm; codecs=\"opus\"", 160_000)],
            formats: vec![format(None, "video/mp4", 500_000)],
        };

        assert!(select_format(&streaming).is_none());
    }
}
