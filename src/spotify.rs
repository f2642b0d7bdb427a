//! Spotify Web API retrieval.
//!
//! Spotify is a metadata-only catalog: the strategy here yields track,
//! album, playlist and artist metadata, which the bridge then pairs
//! with a playable counterpart. There is no page-scrape fallback; when
//! application credentials are not configured the chain has nothing to
//! fall back to and the reference fails as unavailable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    http,
    protocol::spotify as protocol,
    reference::{Catalog, ResourceKind, TrackReference},
    session::SessionStore,
    strategy::{Outcome, Resolved, Strategy},
    track::{ResolvedCollection, TrackMetadata},
    util,
};

/// Web API endpoint root.
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Market parameter for the top-tracks endpoint, which refuses to
/// answer without one.
const TOP_TRACKS_MARKET: &str = "US";

/// Structured retrieval through the official Web API with a
/// client-credentials bearer token.
pub struct WebApiStrategy {
    http_client: Arc<http::Client>,
    sessions: Arc<SessionStore>,
    enabled: bool,
}

impl WebApiStrategy {
    #[must_use]
    pub fn new(
        config: &Config,
        http_client: Arc<http::Client>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            http_client,
            sessions,
            enabled: config.has_spotify_credentials(),
        }
    }

    /// Performs an authorized `GET` against the Web API and parses the
    /// JSON response body.
    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let credential = self.sessions.credential(Catalog::Spotify).await?;
        let token = credential
            .bearer()
            .ok_or_else(|| Error::internal("spotify session yielded no bearer token"))?;

        let url = Url::parse(&format!("{API_BASE_URL}{path}"))?;
        let mut request = self.http_client.get(url, "");
        let headers = request.headers_mut();
        headers.try_insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.access_token))?,
        )?;

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::from(status));
        }

        Ok(response.json::<T>().await?)
    }

    async fn track(&self, id: &str) -> Result<Resolved> {
        let track: protocol::Track = self.get_json(&format!("/tracks/{id}")).await?;
        Ok(Resolved::Track(track_metadata(track)))
    }

    async fn album(&self, id: &str) -> Result<Resolved> {
        let album: protocol::Album = self.get_json(&format!("/albums/{id}")).await?;

        let artist = first_artist(&album.artists);
        let name = format!("{} - {artist}", util::or_unknown(album.name));
        let tracks = album
            .tracks
            .items
            .into_iter()
            .map(track_metadata)
            .collect();

        Ok(Resolved::Collection(ResolvedCollection { name, tracks }))
    }

    async fn playlist(&self, id: &str) -> Result<Resolved> {
        let playlist: protocol::Playlist = self.get_json(&format!("/playlists/{id}")).await?;

        // Entries whose track was removed come back with a null track.
        let tracks = playlist
            .tracks
            .items
            .into_iter()
            .filter_map(|entry| entry.track)
            .map(track_metadata)
            .collect();

        Ok(Resolved::Collection(ResolvedCollection {
            name: util::or_unknown(playlist.name),
            tracks,
        }))
    }

    async fn artist_top_tracks(&self, id: &str) -> Result<Resolved> {
        let artist: protocol::ArtistDetails = self.get_json(&format!("/artists/{id}")).await?;
        let top: protocol::TopTracks = self
            .get_json(&format!(
                "/artists/{id}/top-tracks?market={TOP_TRACKS_MARKET}"
            ))
            .await?;

        let name = format!("{} - Top Tracks", util::or_unknown(artist.name));
        let tracks = top.tracks.into_iter().map(track_metadata).collect();

        Ok(Resolved::Collection(ResolvedCollection { name, tracks }))
    }
}

#[async_trait]
impl Strategy for WebApiStrategy {
    fn name(&self) -> &'static str {
        "spotify-web-api"
    }

    async fn attempt(&self, reference: &TrackReference) -> Outcome {
        if !self.enabled {
            return Outcome::Skipped("spotify credentials not configured".to_owned());
        }

        let result = match reference.kind {
            ResourceKind::Track => self.track(&reference.id).await,
            ResourceKind::Album => self.album(&reference.id).await,
            ResourceKind::Playlist => self.playlist(&reference.id).await,
            ResourceKind::ArtistTopTracks => self.artist_top_tracks(&reference.id).await,
            ResourceKind::Search => {
                return Outcome::Skipped("spotify search is not supported".to_owned());
            }
        };

        match result {
            Ok(resolved) => Outcome::Matched(resolved),
            Err(error) => Outcome::from_error(error),
        }
    }
}

/// The ordered strategy list for the metadata catalog. Spotify has no
/// credential-free fallback, so the chain is a single entry.
#[must_use]
pub fn strategies(
    config: &Config,
    http_client: &Arc<http::Client>,
    sessions: &Arc<SessionStore>,
) -> Vec<Box<dyn Strategy>> {
    vec![Box::new(WebApiStrategy::new(
        config,
        Arc::clone(http_client),
        Arc::clone(sessions),
    ))]
}

fn first_artist(artists: &[protocol::Artist]) -> String {
    artists
        .first()
        .map_or_else(|| util::UNKNOWN.to_owned(), |artist| artist.name.clone())
}

fn track_metadata(track: protocol::Track) -> TrackMetadata {
    let artist = first_artist(&track.artists);
    TrackMetadata {
        catalog: Catalog::Spotify,
        id: track.id,
        title: util::or_unknown(track.name),
        artist,
        duration: Duration::from_millis(track.duration_ms),
        uri: track.uri,
        is_live: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track(id: &str, name: &str, artist: &str) -> protocol::Track {
        protocol::Track {
            id: id.to_owned(),
            name: name.to_owned(),
            uri: format!("spotify:track:{id}"),
            duration_ms: 200_000,
            artists: vec![protocol::Artist {
                name: artist.to_owned(),
            }],
        }
    }

    #[test]
    fn track_metadata_takes_first_artist() {
        let mut track = sample_track("6rqhFgbbKwnb9MLmUQDhG6", "Breathe", "Pink Floyd");
        track.artists.push(protocol::Artist {
            name: "Someone Else".to_owned(),
        });

        let metadata = track_metadata(track);
        assert_eq!(metadata.catalog, Catalog::Spotify);
        assert_eq!(metadata.artist, "Pink Floyd");
        assert_eq!(metadata.duration, Duration::from_secs(200));
        assert!(!metadata.is_live);
    }

    #[test]
    fn track_metadata_defaults_missing_fields() {
        let mut track = sample_track("6rqhFgbbKwnb9MLmUQDhG6", "", "unused");
        track.artists.clear();

        let metadata = track_metadata(track);
        assert_eq!(metadata.title, util::UNKNOWN);
        assert_eq!(metadata.artist, util::UNKNOWN);
    }
}
