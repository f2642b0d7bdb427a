//! Track model.
//!
//! Resolution produces [`TrackMetadata`] records; playable tracks are a
//! tagged variant over [`NativeTrack`] (YouTube-backed) and
//! [`BridgedTrack`] (Spotify metadata delegating playback to an owned
//! YouTube match). There is no delegation hierarchy: a bridged track
//! simply owns the native track it plays through.

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    error::Result,
    reference::Catalog,
    stream::{StreamDescriptor, StreamLocator},
};

/// Normalized metadata for one resolved resource.
///
/// Invariants: `id` is non-empty; `title` and `artist` fall back to the
/// literal `"Unknown"`, never to an empty string; unknown durations are
/// zero.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TrackMetadata {
    /// Catalog this metadata came from.
    pub catalog: Catalog,
    /// Catalog-native resource id.
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Zero when the upstream response did not carry a duration.
    pub duration: Duration,
    /// Canonical URI of the resource in its own catalog.
    pub uri: String,
    pub is_live: bool,
}

impl TrackMetadata {
    /// Whether this catalog can serve audio for the resource itself.
    /// Spotify holds metadata only; its tracks must be bridged.
    #[must_use]
    pub fn is_directly_playable(&self) -> bool {
        self.catalog == Catalog::YouTube
    }
}

impl fmt::Display for TrackMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{} - {}\"", self.id, self.artist, self.title)
    }
}

/// An ordered collection of resolved metadata, in upstream catalog
/// order. Collections are ordered playlists, not sets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedCollection {
    pub name: String,
    pub tracks: Vec<TrackMetadata>,
}

/// A track backed directly by the playable catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NativeTrack {
    pub metadata: TrackMetadata,
}

impl NativeTrack {
    #[must_use]
    pub fn new(metadata: TrackMetadata) -> Self {
        Self { metadata }
    }

    /// The YouTube video id used for stream lookup.
    #[must_use]
    pub fn video_id(&self) -> &str {
        &self.metadata.id
    }
}

/// A non-playable track paired with the playable match it delegates to.
///
/// Display fields come from `source`; playback (stream lookup,
/// duration) delegates to `playable`. Both records are exclusively
/// owned here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgedTrack {
    pub source: TrackMetadata,
    pub playable: NativeTrack,
}

/// A playable track: either native to the playable catalog or bridged
/// into it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Track {
    Native(NativeTrack),
    Bridged(BridgedTrack),
}

impl Track {
    /// Title shown to the user. For bridged tracks this is the source
    /// catalog's title, not the matched upload's.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Native(track) => &track.metadata.title,
            Self::Bridged(track) => &track.source.title,
        }
    }

    /// Artist shown to the user.
    #[must_use]
    pub fn artist(&self) -> &str {
        match self {
            Self::Native(track) => &track.metadata.artist,
            Self::Bridged(track) => &track.source.artist,
        }
    }

    /// Playback duration. Bridged tracks report the matched upload's
    /// duration, since that is what actually plays.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match self {
            Self::Native(track) => track.metadata.duration,
            Self::Bridged(track) => track.playable.metadata.duration,
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        match self {
            Self::Native(track) => track.metadata.is_live,
            Self::Bridged(track) => track.playable.metadata.is_live,
        }
    }

    /// The video id that playback streams from.
    #[must_use]
    pub fn video_id(&self) -> &str {
        match self {
            Self::Native(track) => track.video_id(),
            Self::Bridged(track) => track.playable.video_id(),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{} - {}\"", self.video_id(), self.artist(), self.title())
    }
}

/// An ordered collection of playable tracks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Collection {
    pub name: String,
    pub tracks: Vec<Track>,
}

/// A resolved track handed to the playback pipeline.
///
/// Stream URLs are short-lived, so the descriptor is fetched lazily at
/// playback start via [`PlayableItem::stream`], never at resolution
/// time.
#[derive(Clone)]
pub struct PlayableItem {
    track: Track,
    locator: Arc<StreamLocator>,
}

impl PlayableItem {
    #[must_use]
    pub fn new(track: Track, locator: Arc<StreamLocator>) -> Self {
        Self { track, locator }
    }

    #[must_use]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.track.title()
    }

    #[must_use]
    pub fn artist(&self) -> &str {
        self.track.artist()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.track.duration()
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.track.is_live()
    }

    /// Fetches a fresh stream descriptor for this track.
    ///
    /// # Errors
    ///
    /// Failure here is terminal for this playback attempt; the engine
    /// does not retry beyond the locator's single credential-refresh
    /// retry.
    pub async fn stream(&self) -> Result<StreamDescriptor> {
        self.locator.locate(self.track.video_id()).await
    }
}

impl fmt::Display for PlayableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.track.fmt(f)
    }
}

/// An ordered collection of playable items, preserving upstream
/// catalog order.
#[derive(Clone)]
pub struct PlayableCollection {
    pub name: String,
    pub items: Vec<PlayableItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(catalog: Catalog, id: &str, title: &str, artist: &str, secs: u64) -> TrackMetadata {
        TrackMetadata {
            catalog,
            id: id.to_owned(),
            title: title.to_owned(),
            artist: artist.to_owned(),
            duration: Duration::from_secs(secs),
            uri: format!("https://example.com/{id}"),
            is_live: false,
        }
    }

    #[test]
    fn playability_follows_catalog() {
        assert!(metadata(Catalog::YouTube, "dQw4w9WgXcQ", "t", "a", 1).is_directly_playable());
        assert!(!metadata(Catalog::Spotify, "6rqhFgbbKwnb9MLmUQDhG6", "t", "a", 1)
            .is_directly_playable());
    }

    #[test]
    fn bridged_track_displays_source_but_plays_delegate() {
        let source = metadata(Catalog::Spotify, "sp1", "Song", "Artist", 200);
        let playable = NativeTrack::new(metadata(
            Catalog::YouTube,
            "dQw4w9WgXcQ",
            "Song (Official Video)",
            "ArtistVEVO",
            203,
        ));

        let track = Track::Bridged(BridgedTrack { source, playable });
        assert_eq!(track.title(), "Song");
        assert_eq!(track.artist(), "Artist");
        assert_eq!(track.video_id(), "dQw4w9WgXcQ");
        assert_eq!(track.duration(), Duration::from_secs(203));
    }
}
