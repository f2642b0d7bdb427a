//! Cross-service bridge.
//!
//! Spotify can only describe a track; playing one means finding its
//! counterpart on YouTube. The bridge searches the playable catalog
//! with `"{artist} - {title}"` and takes the first result as the
//! match. No secondary ranking is performed: upstream search relevance
//! has proven more reliable in practice than any local similarity
//! scoring, so [`crate::util::title_similarity`] is deliberately not
//! consulted here.

use std::sync::Arc;

use futures_util::{stream, StreamExt};

use crate::{
    error::{Error, Result},
    reference::TrackReference,
    strategy::{Resolved, StrategyChain},
    track::{BridgedTrack, Collection, NativeTrack, ResolvedCollection, Track, TrackMetadata},
    util,
};

/// Upper bound on concurrent member bridges when resolving a
/// collection, to avoid hammering the search endpoint.
pub const BRIDGE_CONCURRENCY: usize = 4;

/// Pairs metadata-only tracks with playable matches.
pub struct Bridge {
    playable: Arc<StrategyChain>,
}

impl Bridge {
    #[must_use]
    pub fn new(playable: Arc<StrategyChain>) -> Self {
        Self { playable }
    }

    /// Finds the playable counterpart of a single metadata-only track.
    ///
    /// A search that yields no results is a not-found failure worded as
    /// a missing playable match, so callers can tell "the track does
    /// not exist" apart from "no equivalent upload was found".
    pub async fn bridge(&self, source: TrackMetadata) -> Result<BridgedTrack> {
        let query = util::search_query(&source.artist, &source.title);
        let reference = TrackReference::youtube_search(&query);

        let resolved = self.playable.resolve(&reference).await?;
        let Resolved::Collection(collection) = resolved else {
            return Err(Error::internal(format!(
                "search for \"{query}\" did not produce a collection"
            )));
        };

        let matched = collection.tracks.into_iter().next().ok_or_else(|| {
            Error::not_found(format!("no playable match found for \"{query}\""))
        })?;

        debug!("bridged {source} to {matched}");
        Ok(BridgedTrack {
            source,
            playable: NativeTrack::new(matched),
        })
    }

    /// Bridges every member of a collection, preserving upstream order.
    ///
    /// Members bridge concurrently up to [`BRIDGE_CONCURRENCY`];
    /// members that fail to bridge are logged and omitted rather than
    /// failing the whole collection.
    pub async fn bridge_collection(&self, collection: ResolvedCollection) -> Collection {
        let total = collection.tracks.len();

        let bridged: Vec<Option<Track>> = stream::iter(collection.tracks)
            .map(|metadata| self.member(metadata))
            .buffered(BRIDGE_CONCURRENCY)
            .collect()
            .await;
        let tracks: Vec<Track> = bridged.into_iter().flatten().collect();

        if tracks.len() < total {
            info!(
                "bridged {} of {total} members of \"{}\"",
                tracks.len(),
                collection.name
            );
        }

        Collection {
            name: collection.name,
            tracks,
        }
    }

    async fn member(&self, metadata: TrackMetadata) -> Option<Track> {
        if metadata.is_directly_playable() {
            return Some(Track::Native(NativeTrack::new(metadata)));
        }

        match self.bridge(metadata.clone()).await {
            Ok(bridged) => Some(Track::Bridged(bridged)),
            Err(error) => {
                warn!("skipping {metadata}: {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::ErrorKind;
    use crate::reference::{Catalog, ResourceKind};
    use crate::session::Credential;
    use crate::strategy::{Outcome, SessionControl, Strategy};

    struct NoRefresh;

    #[async_trait]
    impl SessionControl for NoRefresh {
        async fn refresh(&self, _catalog: Catalog) -> crate::error::Result<Credential> {
            Err(Error::unavailable("refresh not expected in this test"))
        }
    }

    /// Answers search queries from a fixed table; unknown queries yield
    /// an empty result set.
    struct TableSearch {
        results: Vec<(&'static str, Vec<TrackMetadata>)>,
    }

    #[async_trait]
    impl Strategy for TableSearch {
        fn name(&self) -> &'static str {
            "table-search"
        }

        async fn attempt(&self, reference: &TrackReference) -> Outcome {
            assert_eq!(reference.kind, ResourceKind::Search);
            let tracks = self
                .results
                .iter()
                .find(|(query, _)| *query == reference.id)
                .map(|(_, tracks)| tracks.clone())
                .unwrap_or_default();

            Outcome::Matched(Resolved::Collection(ResolvedCollection {
                name: format!("Search results for: {}", reference.id),
                tracks,
            }))
        }
    }

    fn bridge_with(results: Vec<(&'static str, Vec<TrackMetadata>)>) -> Bridge {
        let chain = StrategyChain::new(
            Catalog::YouTube,
            vec![Box::new(TableSearch { results })],
            Arc::new(NoRefresh),
        );
        Bridge::new(Arc::new(chain))
    }

    fn spotify_track(id: &str, title: &str, artist: &str) -> TrackMetadata {
        TrackMetadata {
            catalog: Catalog::Spotify,
            id: id.to_owned(),
            title: title.to_owned(),
            artist: artist.to_owned(),
            duration: Duration::from_secs(180),
            uri: format!("spotify:track:{id}"),
            is_live: false,
        }
    }

    fn youtube_track(id: &str, title: &str) -> TrackMetadata {
        TrackMetadata {
            catalog: Catalog::YouTube,
            id: id.to_owned(),
            title: title.to_owned(),
            artist: "Uploader".to_owned(),
            duration: Duration::from_secs(185),
            uri: format!("https://www.youtube.com/watch?v={id}"),
            is_live: false,
        }
    }

    #[tokio::test]
    async fn first_search_result_wins() {
        let bridge = bridge_with(vec![(
            "Rick Astley - Never Gonna Give You Up",
            vec![
                youtube_track("dQw4w9WgXcQ", "Never Gonna Give You Up"),
                youtube_track("oHg5SJYRHA0", "some reupload"),
            ],
        )]);

        let source = spotify_track("4PTG3Z6ehGkBFwjybzWkR8", "Never Gonna Give You Up", "Rick Astley");
        let bridged = bridge.bridge(source.clone()).await.unwrap();
        assert_eq!(bridged.playable.video_id(), "dQw4w9WgXcQ");
        assert_eq!(bridged.source, source);
    }

    #[tokio::test]
    async fn empty_search_is_a_missing_playable_match() {
        let bridge = bridge_with(vec![]);

        let error = bridge
            .bridge(spotify_track("x", "Obscure B-Side", "Nobody"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NotFound);
        assert!(error.to_string().contains("playable match"));
    }

    #[tokio::test]
    async fn collection_skips_failed_members_and_preserves_order() {
        let bridge = bridge_with(vec![
            ("A - One", vec![youtube_track("aaaaaaaaaaa", "One")]),
            // "B - Two" is absent from the table, so member 2 fails.
            ("C - Three", vec![youtube_track("ccccccccccc", "Three")]),
        ]);

        let collection = ResolvedCollection {
            name: "Mixed".to_owned(),
            tracks: vec![
                spotify_track("1", "One", "A"),
                spotify_track("2", "Two", "B"),
                spotify_track("3", "Three", "C"),
            ],
        };

        let playable = bridge.bridge_collection(collection).await;
        assert_eq!(playable.name, "Mixed");
        assert_eq!(playable.tracks.len(), 2);
        assert_eq!(playable.tracks[0].video_id(), "aaaaaaaaaaa");
        assert_eq!(playable.tracks[1].video_id(), "ccccccccccc");
    }

    #[tokio::test]
    async fn native_members_pass_through_unbridged() {
        let bridge = bridge_with(vec![]);

        let collection = ResolvedCollection {
            name: "Natives".to_owned(),
            tracks: vec![youtube_track("dQw4w9WgXcQ", "Never Gonna Give You Up")],
        };

        let playable = bridge.bridge_collection(collection).await;
        assert_eq!(playable.tracks.len(), 1);
        assert!(matches!(playable.tracks[0], Track::Native(_)));
    }
}
