//! YouTube API response models.
//!
//! The Data API has a stable schema and gets typed models. Innertube's
//! renderer trees are deeply nested and change shape without notice, so
//! only the shallow player response is typed; browse and search results
//! are walked as loose [`serde_json::Value`] trees by the strategies.

use serde::Deserialize;

// --- Data API ---

/// Common snippet of video and search resources.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContentDetails {
    /// ISO 8601, e.g. `PT4M13S`.
    pub duration: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub snippet: Snippet,
    pub content_details: VideoContentDetails,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: Snippet,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchList {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Playlist {
    pub snippet: PlaylistSnippet,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistList {
    #[serde(default)]
    pub items: Vec<Playlist>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: String,
    #[serde(default)]
    pub video_owner_channel_title: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemDetails {
    pub video_id: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
    pub content_details: PlaylistItemDetails,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistItemList {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

// --- Innertube ---

/// Innertube `/player` response, also embedded in the watch page as
/// `ytInitialPlayerResponse`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub video_details: Option<VideoDetails>,
    pub streaming_data: Option<StreamingData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Carried as a string by Innertube.
    #[serde(default)]
    pub length_seconds: String,
    #[serde(default)]
    pub is_live_content: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    #[serde(default)]
    pub adaptive_formats: Vec<StreamFormat>,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

/// One encoded variant of a stream.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFormat {
    /// Absent for ciphered formats, which the engine skips.
    pub url: Option<String>,
    pub mime_type: String,
    pub bitrate: Option<u64>,
}

impl StreamFormat {
    /// Whether this variant carries audio without video.
    #[must_use]
    pub fn is_audio_only(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }
}
