//! Durable track encoding.
//!
//! The encoding is the only artifact that outlives a process: hosts
//! persist queued tracks and hand the bytes back later, possibly to a
//! newer build. Layout is a version byte, a source tag, then
//! length-prefixed UTF-8 strings (big-endian `u16` lengths).
//!
//! A native track stores only its video id; stream URLs are short-lived
//! and never persisted. A bridged track stores the source id plus the
//! display title and artist, enough to re-run the bridge on decode.
//! The previously matched upload is deliberately not stored, so decodes
//! after a matching change still converge on a current result.
//! Trailing bytes after the last field are ignored for forward
//! compatibility.

use crate::{
    error::{Error, Result},
    reference::Catalog,
    track::{NativeTrack, Track, TrackMetadata},
    util,
    youtube::watch_uri,
};

/// Current encoding version.
pub const FORMAT_VERSION: u8 = 1;

const TAG_NATIVE: u8 = 1;
const TAG_BRIDGED: u8 = 2;

/// The persisted form of a track, parsed but not yet re-resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodedTrack {
    Native {
        video_id: String,
    },
    Bridged {
        source_id: String,
        title: String,
        artist: String,
    },
}

/// Encodes a playable track into its durable form.
pub fn encode(track: &Track) -> Result<Vec<u8>> {
    let mut bytes = vec![FORMAT_VERSION];

    match track {
        Track::Native(native) => {
            bytes.push(TAG_NATIVE);
            put_string(&mut bytes, native.video_id())?;
        }
        Track::Bridged(bridged) => {
            bytes.push(TAG_BRIDGED);
            put_string(&mut bytes, &bridged.source.id)?;
            put_string(&mut bytes, &bridged.source.title)?;
            put_string(&mut bytes, &bridged.source.artist)?;
        }
    }

    Ok(bytes)
}

/// Parses a durable encoding. Fails on truncation, an unknown version,
/// or an unknown source tag; tolerates trailing bytes.
pub fn decode(bytes: &[u8]) -> Result<EncodedTrack> {
    let mut reader = Reader::new(bytes);

    let version = reader.u8()?;
    if version != FORMAT_VERSION {
        return Err(Error::data_loss(format!(
            "unsupported encoding version {version}"
        )));
    }

    match reader.u8()? {
        TAG_NATIVE => Ok(EncodedTrack::Native {
            video_id: reader.string()?,
        }),
        TAG_BRIDGED => Ok(EncodedTrack::Bridged {
            source_id: reader.string()?,
            title: reader.string()?,
            artist: reader.string()?,
        }),
        tag => Err(Error::data_loss(format!("unknown source tag {tag}"))),
    }
}

impl EncodedTrack {
    /// Turns a parsed encoding back into a playable track.
    ///
    /// Native encodings store no display metadata; hosts persist it
    /// alongside the bytes and supply it back as `hint`, which restores
    /// the title, artist, duration and liveness. Without a hint those
    /// fields fall back to placeholders.
    ///
    /// Bridged encodings carry their own display metadata and re-run
    /// the bridge; a bridge miss is a decode failure since the
    /// persisted reference can no longer be played.
    pub async fn revive(
        self,
        bridge: &crate::bridge::Bridge,
        hint: Option<TrackMetadata>,
    ) -> Result<Track> {
        match self {
            Self::Native { video_id } => {
                let uri = watch_uri(&video_id);
                let (title, artist, duration, is_live) = match hint {
                    Some(hint) => (hint.title, hint.artist, hint.duration, hint.is_live),
                    None => (
                        util::UNKNOWN.to_owned(),
                        util::UNKNOWN.to_owned(),
                        std::time::Duration::ZERO,
                        false,
                    ),
                };

                Ok(Track::Native(NativeTrack::new(TrackMetadata {
                    catalog: Catalog::YouTube,
                    id: video_id,
                    title: util::or_unknown(title),
                    artist: util::or_unknown(artist),
                    duration,
                    uri,
                    is_live,
                })))
            }
            Self::Bridged {
                source_id,
                title,
                artist,
            } => {
                let source = TrackMetadata {
                    catalog: Catalog::Spotify,
                    uri: format!("spotify:track:{source_id}"),
                    id: source_id,
                    title: util::or_unknown(title),
                    artist: util::or_unknown(artist),
                    duration: std::time::Duration::ZERO,
                    is_live: false,
                };

                let bridged = bridge.bridge(source).await.map_err(|error| {
                    Error::data_loss(format!("persisted track can no longer be resolved: {error}"))
                })?;
                Ok(Track::Bridged(bridged))
            }
        }
    }
}

fn put_string(bytes: &mut Vec<u8>, value: &str) -> Result<()> {
    let length = u16::try_from(value.len())
        .map_err(|_| Error::invalid_argument(format!("string of {} bytes", value.len())))?;

    bytes.extend_from_slice(&length.to_be_bytes());
    bytes.extend_from_slice(value.as_bytes());
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| Error::data_loss("truncated encoding"))?;

        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn string(&mut self) -> Result<String> {
        let length = self.take(2)?;
        let length = usize::from(u16::from_be_bytes([length[0], length[1]]));
        String::from_utf8(self.take(length)?.to_vec())
            .map_err(|e| Error::data_loss(format!("malformed string payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::bridge::Bridge;
    use crate::error::ErrorKind;
    use crate::session::Credential;
    use crate::strategy::{Outcome, Resolved, SessionControl, Strategy, StrategyChain};
    use crate::track::ResolvedCollection;

    struct NoRefresh;

    #[async_trait]
    impl SessionControl for NoRefresh {
        async fn refresh(&self, _catalog: Catalog) -> Result<Credential> {
            Err(Error::unavailable("refresh not expected in this test"))
        }
    }

    /// Answers every search with the same fixed result set.
    struct FixedSearch {
        tracks: Vec<TrackMetadata>,
    }

    #[async_trait]
    impl Strategy for FixedSearch {
        fn name(&self) -> &'static str {
            "fixed-search"
        }

        async fn attempt(&self, reference: &crate::reference::TrackReference) -> Outcome {
            Outcome::Matched(Resolved::Collection(ResolvedCollection {
                name: format!("Search results for: {}", reference.id),
                tracks: self.tracks.clone(),
            }))
        }
    }

    fn bridge_returning(tracks: Vec<TrackMetadata>) -> Bridge {
        let chain = StrategyChain::new(
            Catalog::YouTube,
            vec![Box::new(FixedSearch { tracks })],
            Arc::new(NoRefresh),
        );
        Bridge::new(Arc::new(chain))
    }

    fn native(id: &str) -> Track {
        Track::Native(NativeTrack::new(TrackMetadata {
            catalog: Catalog::YouTube,
            id: id.to_owned(),
            title: "Never Gonna Give You Up".to_owned(),
            artist: "Rick Astley".to_owned(),
            duration: Duration::from_secs(212),
            uri: watch_uri(id),
            is_live: false,
        }))
    }

    fn bridged() -> Track {
        let source = TrackMetadata {
            catalog: Catalog::Spotify,
            id: "4PTG3Z6ehGkBFwjybzWkR8".to_owned(),
            title: "Never Gonna Give You Up".to_owned(),
            artist: "Rick Astley".to_owned(),
            duration: Duration::from_secs(213),
            uri: "spotify:track:4PTG3Z6ehGkBFwjybzWkR8".to_owned(),
            is_live: false,
        };
        let playable = match native("dQw4w9WgXcQ") {
            Track::Native(track) => track,
            Track::Bridged(_) => unreachable!(),
        };
        Track::Bridged(crate::track::BridgedTrack { source, playable })
    }

    #[test]
    fn native_round_trip() {
        let bytes = encode(&native("dQw4w9WgXcQ")).unwrap();
        assert_eq!(bytes[0], FORMAT_VERSION);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(
            decoded,
            EncodedTrack::Native {
                video_id: "dQw4w9WgXcQ".to_owned()
            }
        );
    }

    #[test]
    fn bridged_round_trip_keeps_display_metadata() {
        let bytes = encode(&bridged()).unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(
            decoded,
            EncodedTrack::Bridged {
                source_id: "4PTG3Z6ehGkBFwjybzWkR8".to_owned(),
                title: "Never Gonna Give You Up".to_owned(),
                artist: "Rick Astley".to_owned(),
            }
        );
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = encode(&native("dQw4w9WgXcQ")).unwrap();
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(decode(&bytes).is_ok());
    }

    #[test]
    fn truncation_is_a_decode_failure() {
        let bytes = encode(&bridged()).unwrap();
        for end in 0..bytes.len() {
            let error = decode(&bytes[..end]).unwrap_err();
            assert_eq!(error.kind, crate::error::ErrorKind::DataLoss, "at {end}");
        }
    }

    #[test]
    fn unknown_version_and_tag_are_rejected() {
        let mut bytes = encode(&native("dQw4w9WgXcQ")).unwrap();
        bytes[0] = 99;
        assert!(decode(&bytes).is_err());

        let mut bytes = encode(&native("dQw4w9WgXcQ")).unwrap();
        bytes[1] = 99;
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn invalid_utf8_payload_is_a_decode_failure() {
        // Native tag with a well-framed but non-UTF-8 string payload.
        let bytes = [FORMAT_VERSION, TAG_NATIVE, 0x00, 0x02, 0xff, 0xfe];
        let error = decode(&bytes).unwrap_err();
        assert_eq!(error.kind, ErrorKind::DataLoss);
    }

    #[tokio::test]
    async fn native_revive_restores_display_metadata_from_hint() {
        let track = native("dQw4w9WgXcQ");
        let hint = match &track {
            Track::Native(native) => native.metadata.clone(),
            Track::Bridged(_) => unreachable!(),
        };

        let bytes = encode(&track).unwrap();
        let bridge = bridge_returning(Vec::new());
        let revived = decode(&bytes)
            .unwrap()
            .revive(&bridge, Some(hint))
            .await
            .unwrap();

        assert_eq!(revived.title(), "Never Gonna Give You Up");
        assert_eq!(revived.artist(), "Rick Astley");
        assert_eq!(revived.duration(), Duration::from_secs(212));
        assert_eq!(revived.video_id(), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn native_revive_without_hint_falls_back_to_placeholders() {
        let bytes = encode(&native("dQw4w9WgXcQ")).unwrap();
        let bridge = bridge_returning(Vec::new());

        let revived = decode(&bytes).unwrap().revive(&bridge, None).await.unwrap();
        assert_eq!(revived.title(), util::UNKNOWN);
        assert_eq!(revived.artist(), util::UNKNOWN);
        assert_eq!(revived.video_id(), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn bridged_revive_reruns_the_bridge() {
        let matched = TrackMetadata {
            catalog: Catalog::YouTube,
            id: "dQw4w9WgXcQ".to_owned(),
            title: "Never Gonna Give You Up (Official Video)".to_owned(),
            artist: "Rick Astley".to_owned(),
            duration: Duration::from_secs(212),
            uri: watch_uri("dQw4w9WgXcQ"),
            is_live: false,
        };
        let bridge = bridge_returning(vec![matched]);

        let bytes = encode(&bridged()).unwrap();
        let revived = decode(&bytes).unwrap().revive(&bridge, None).await.unwrap();

        // Display fields come from the persisted source metadata; the
        // stream comes from the freshly matched upload.
        assert!(matches!(revived, Track::Bridged(_)));
        assert_eq!(revived.title(), "Never Gonna Give You Up");
        assert_eq!(revived.artist(), "Rick Astley");
        assert_eq!(revived.video_id(), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn bridged_revive_without_match_is_a_decode_failure() {
        let bridge = bridge_returning(Vec::new());

        let bytes = encode(&bridged()).unwrap();
        let error = decode(&bytes)
            .unwrap()
            .revive(&bridge, None)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::DataLoss);
    }

    #[test]
    fn non_ascii_metadata_survives() {
        let source = TrackMetadata {
            catalog: Catalog::Spotify,
            id: "abc".to_owned(),
            title: "Fröhlich — Ω".to_owned(),
            artist: "Björk".to_owned(),
            duration: Duration::ZERO,
            uri: "spotify:track:abc".to_owned(),
            is_live: false,
        };
        let playable = NativeTrack::new(TrackMetadata {
            catalog: Catalog::YouTube,
            id: "dQw4w9WgXcQ".to_owned(),
            title: String::new(),
            artist: String::new(),
            duration: Duration::ZERO,
            uri: watch_uri("dQw4w9WgXcQ"),
            is_live: false,
        });
        let track = Track::Bridged(crate::track::BridgedTrack { source, playable });

        let decoded = decode(&encode(&track).unwrap()).unwrap();
        let EncodedTrack::Bridged { title, artist, .. } = decoded else {
            panic!("expected bridged encoding");
        };
        assert_eq!(title, "Fröhlich — Ω");
        assert_eq!(artist, "Björk");
    }
}
