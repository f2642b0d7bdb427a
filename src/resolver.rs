//! Top-level resolution entry point.
//!
//! A [`Resolver`] wires the classifier, session store, strategy
//! chains, bridge and stream locator together and exposes the two
//! operations hosts consume: [`Resolver::resolve`] for free-form
//! identifiers and [`Resolver::decode`] for persisted encodings.
//! Resolution requests are independent; a resolver is shared behind an
//! `Arc` and used from any number of tasks.

use std::sync::Arc;

use crate::{
    bridge::Bridge,
    codec,
    config::Config,
    error::Result,
    http,
    reference::{self, Catalog},
    session::SessionStore,
    spotify,
    strategy::{Resolved, SessionControl, StrategyChain},
    stream::StreamLocator,
    track::{NativeTrack, PlayableCollection, PlayableItem, Track, TrackMetadata},
    youtube,
};

/// Outcome of resolving a recognized identifier.
pub enum ResolvedItem {
    Item(PlayableItem),
    Collection(PlayableCollection),
}

/// The resolution engine.
pub struct Resolver {
    sessions: Arc<SessionStore>,
    youtube: Arc<StrategyChain>,
    spotify: Arc<StrategyChain>,
    bridge: Bridge,
    locator: Arc<StreamLocator>,
}

impl Resolver {
    /// Builds a resolver and its HTTP client from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let http_client = Arc::new(http::Client::new(&config)?);
        let sessions = Arc::new(SessionStore::new(config.clone(), Arc::clone(&http_client)));

        let youtube = Arc::new(StrategyChain::new(
            Catalog::YouTube,
            youtube::strategies(&config, &http_client, &sessions),
            Arc::clone(&sessions) as Arc<dyn SessionControl>,
        ));
        let spotify = Arc::new(StrategyChain::new(
            Catalog::Spotify,
            spotify::strategies(&config, &http_client, &sessions),
            Arc::clone(&sessions) as Arc<dyn SessionControl>,
        ));

        let bridge = Bridge::new(Arc::clone(&youtube));
        let locator = Arc::new(StreamLocator::new(
            Arc::clone(&http_client),
            Arc::clone(&sessions),
        ));

        Ok(Self {
            sessions,
            youtube,
            spotify,
            bridge,
            locator,
        })
    }

    /// Resolves a free-form identifier.
    ///
    /// Returns `Ok(None)` when the identifier matches no known shape,
    /// so hosts can distinguish "not ours" from a failed lookup.
    pub async fn resolve(&self, identifier: &str) -> Result<Option<ResolvedItem>> {
        let Some(track_ref) = reference::classify(identifier) else {
            debug!("unrecognized identifier: {identifier}");
            return Ok(None);
        };
        info!("resolving {track_ref}");

        let resolved = self.chain(track_ref.catalog).resolve(&track_ref).await?;
        match resolved {
            Resolved::Track(metadata) => {
                let track = if metadata.is_directly_playable() {
                    Track::Native(NativeTrack::new(metadata))
                } else {
                    Track::Bridged(self.bridge.bridge(metadata).await?)
                };

                Ok(Some(ResolvedItem::Item(self.item(track))))
            }
            Resolved::Collection(collection) => {
                let playable = self.bridge.bridge_collection(collection).await;
                let items = playable.tracks.into_iter().map(|t| self.item(t)).collect();

                Ok(Some(ResolvedItem::Collection(PlayableCollection {
                    name: playable.name,
                    items,
                })))
            }
        }
    }

    /// Revives a persisted track encoding, re-running the bridge for
    /// bridged tracks. `hint` is display metadata the host persisted
    /// alongside the bytes; native encodings restore their title and
    /// artist from it.
    pub async fn decode(
        &self,
        bytes: &[u8],
        hint: Option<TrackMetadata>,
    ) -> Result<PlayableItem> {
        let encoded = codec::decode(bytes)?;
        let track = encoded.revive(&self.bridge, hint).await?;
        Ok(self.item(track))
    }

    /// The session store, exposed so hosts can warm credentials ahead
    /// of the first request if they choose to.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    fn chain(&self, catalog: Catalog) -> &StrategyChain {
        match catalog {
            Catalog::YouTube => &self.youtube,
            Catalog::Spotify => &self.spotify,
        }
    }

    fn item(&self, track: Track) -> PlayableItem {
        PlayableItem::new(track, Arc::clone(&self.locator))
    }
}
