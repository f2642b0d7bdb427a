//! Spotify Web API response models.

use serde::Deserialize;

/// Response of the client-credentials token exchange.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// An artist reference as embedded in track and album objects.
#[derive(Clone, Debug, Deserialize)]
pub struct Artist {
    pub name: String,
}

/// A full or simplified track object.
///
/// Album tracks omit some fields of the full object; everything the
/// engine reads is present in both shapes.
#[derive(Clone, Debug, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// A page of items. The engine reads the first page only.
#[derive(Clone, Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// An album with its (simplified) tracks.
#[derive(Clone, Debug, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub tracks: Page<Track>,
}

/// One playlist entry. `track` is `None` for entries whose track has
/// been removed or is otherwise unavailable.
#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistEntry {
    pub track: Option<Track>,
}

/// A playlist with its entries.
#[derive(Clone, Debug, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub tracks: Page<PlaylistEntry>,
}

/// An artist object.
#[derive(Clone, Debug, Deserialize)]
pub struct ArtistDetails {
    pub name: String,
}

/// Response of the artist top-tracks endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TopTracks {
    #[serde(default)]
    pub tracks: Vec<Track>,
}
