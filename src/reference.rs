//! Identifier classification.
//!
//! Maps a free-form identifier string to a [`TrackReference`] naming the
//! catalog, the resource kind and the catalog-native id. Classification
//! is pure and deterministic: no I/O, same input, same output. Patterns
//! are tried most specific first (bare video id, then canonical URLs,
//! then the search prefix) so ambiguous strings resolve consistently.
//!
//! Recognized shapes:
//! * bare 11-character YouTube video id (`dQw4w9WgXcQ`)
//! * `youtube.com/watch?v=..` and `youtube.com/shorts/..` URLs
//! * `youtu.be/..` short URLs
//! * `youtube.com/playlist?list=..` URLs
//! * `ytsearch:free text` search queries
//! * `open.spotify.com/{track,album,playlist,artist}/..` URLs
//!
//! Anything else is unrecognized, which the engine surfaces as "nothing
//! found" rather than an error.

use std::{fmt, sync::LazyLock};

use regex_lite::Regex;

/// One external music service.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Catalog {
    /// Hosts playable audio.
    YouTube,
    /// Holds metadata only; playback requires bridging to YouTube.
    Spotify,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YouTube => write!(f, "youtube"),
            Self::Spotify => write!(f, "spotify"),
        }
    }
}

/// What kind of resource an identifier points at.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ResourceKind {
    /// A single track or video.
    Track,
    /// An ordered playlist.
    Playlist,
    /// An album; resolves to an ordered collection.
    Album,
    /// An artist's top tracks.
    ArtistTopTracks,
    /// A free-text search query.
    Search,
}

impl ResourceKind {
    /// Whether this kind resolves to a collection of tracks rather than
    /// a single one.
    #[must_use]
    pub fn is_collection(self) -> bool {
        !matches!(self, Self::Track)
    }
}

/// A classified identifier: which catalog, which kind of resource, and
/// the catalog-native id (or the query text for searches).
///
/// Immutable; produced only by [`classify`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TrackReference {
    pub catalog: Catalog,
    pub kind: ResourceKind,
    pub id: String,
}

impl TrackReference {
    /// Builds a search reference against the playable catalog, as the
    /// bridge does for every non-playable track.
    #[must_use]
    pub fn youtube_search(query: impl Into<String>) -> Self {
        Self {
            catalog: Catalog::YouTube,
            kind: ResourceKind::Search,
            id: query.into(),
        }
    }
}

impl fmt::Display for TrackReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}/{}", self.catalog, self.kind, self.id)
    }
}

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z0-9_-]{11})$").expect("invalid video id pattern"));

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?(?:youtube\.com)/(?:watch\?v=|shorts/)([a-zA-Z0-9_-]{11})(?:&.*|\?.*)?$",
    )
    .expect("invalid video url pattern")
});

static SHORT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?youtu\.be/([a-zA-Z0-9_-]{11})(?:\?.*)?$")
        .expect("invalid short url pattern")
});

static PLAYLIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?(?:youtube\.com)/playlist\?list=([a-zA-Z0-9_-]+)(?:&.*)?$",
    )
    .expect("invalid playlist url pattern")
});

static SPOTIFY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:open\.)?spotify\.com/(track|album|playlist|artist)/([a-zA-Z0-9]+)(?:\?.*)?$",
    )
    .expect("invalid spotify url pattern")
});

/// Prefix marking a free-text YouTube search query.
pub const SEARCH_PREFIX: &str = "ytsearch:";

/// Classifies a raw identifier into a [`TrackReference`].
///
/// Returns `None` for identifier shapes the engine does not recognize.
#[must_use]
pub fn classify(identifier: &str) -> Option<TrackReference> {
    let identifier = identifier.trim();

    // Exact id before URL before search: the most specific pattern wins.
    if let Some(captures) = VIDEO_ID.captures(identifier) {
        return Some(TrackReference {
            catalog: Catalog::YouTube,
            kind: ResourceKind::Track,
            id: captures[1].to_owned(),
        });
    }

    for pattern in [&*VIDEO_URL, &*SHORT_URL] {
        if let Some(captures) = pattern.captures(identifier) {
            return Some(TrackReference {
                catalog: Catalog::YouTube,
                kind: ResourceKind::Track,
                id: captures[1].to_owned(),
            });
        }
    }

    if let Some(captures) = PLAYLIST_URL.captures(identifier) {
        return Some(TrackReference {
            catalog: Catalog::YouTube,
            kind: ResourceKind::Playlist,
            id: captures[1].to_owned(),
        });
    }

    if let Some(captures) = SPOTIFY_URL.captures(identifier) {
        let kind = match &captures[1] {
            "track" => ResourceKind::Track,
            "album" => ResourceKind::Album,
            "playlist" => ResourceKind::Playlist,
            _ => ResourceKind::ArtistTopTracks,
        };
        return Some(TrackReference {
            catalog: Catalog::Spotify,
            kind,
            id: captures[2].to_owned(),
        });
    }

    if let Some(query) = identifier.strip_prefix(SEARCH_PREFIX) {
        if !query.trim().is_empty() {
            return Some(TrackReference {
                catalog: Catalog::YouTube,
                kind: ResourceKind::Search,
                id: query.trim().to_owned(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_video_id() {
        let reference = classify("dQw4w9WgXcQ").expect("should classify");
        assert_eq!(reference.catalog, Catalog::YouTube);
        assert_eq!(reference.kind, ResourceKind::Track);
        assert_eq!(reference.id, "dQw4w9WgXcQ");
    }

    #[test]
    fn watch_and_shorts_urls() {
        for identifier in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            let reference = classify(identifier).expect(identifier);
            assert_eq!(reference.catalog, Catalog::YouTube);
            assert_eq!(reference.kind, ResourceKind::Track);
            assert_eq!(reference.id, "dQw4w9WgXcQ");
        }
    }

    #[test]
    fn short_domain_url() {
        let reference = classify("https://youtu.be/dQw4w9WgXcQ?si=xyz").expect("should classify");
        assert_eq!(reference.id, "dQw4w9WgXcQ");
        assert_eq!(reference.kind, ResourceKind::Track);
    }

    #[test]
    fn playlist_url() {
        let reference =
            classify("https://www.youtube.com/playlist?list=PLabc123_-").expect("should classify");
        assert_eq!(reference.catalog, Catalog::YouTube);
        assert_eq!(reference.kind, ResourceKind::Playlist);
        assert_eq!(reference.id, "PLabc123_-");
    }

    #[test]
    fn search_prefix() {
        let reference = classify("ytsearch:never gonna give you up").expect("should classify");
        assert_eq!(reference.kind, ResourceKind::Search);
        assert_eq!(reference.id, "never gonna give you up");
    }

    #[test]
    fn empty_search_is_unrecognized() {
        assert!(classify("ytsearch:   ").is_none());
    }

    #[test]
    fn spotify_shapes() {
        let cases = [
            ("https://open.spotify.com/track/6rqhFgbbKwnb9MLmUQDhG6", ResourceKind::Track),
            ("open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy", ResourceKind::Album),
            ("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=1", ResourceKind::Playlist),
            ("https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF", ResourceKind::ArtistTopTracks),
        ];
        for (identifier, kind) in cases {
            let reference = classify(identifier).expect(identifier);
            assert_eq!(reference.catalog, Catalog::Spotify);
            assert_eq!(reference.kind, kind);
        }
    }

    #[test]
    fn unrecognized_shapes() {
        for identifier in [
            "",
            "not a url at all",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "dQw4w9WgXc", // ten characters, one short of a video id
        ] {
            assert!(classify(identifier).is_none(), "{identifier}");
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let first = classify("dQw4w9WgXcQ");
        let second = classify("dQw4w9WgXcQ");
        assert_eq!(first, second);
    }
}
