//! Short-lived credential state for both catalogs.
//!
//! The [`SessionStore`] is the only shared mutable resource in the
//! engine. Every refresh produces a new immutable snapshot behind an
//! `Arc`; concurrent readers keep whichever snapshot was current when
//! they read it, so a refresh never corrupts a request already in
//! flight. A per-catalog async mutex collapses concurrent refresh
//! attempts into one upstream call.
//!
//! Spotify uses a bearer token from the client-credentials exchange,
//! re-authenticated when missing or within a safety margin of expiry.
//! YouTube uses a cookie jar captured from a session bootstrap request;
//! cookies do not expire on a timer and are only replaced by an
//! explicit forced refresh.
//!
//! Missing application credentials are a normal configuration state:
//! [`SessionStore::credential`] fails with an "unavailable" error that
//! credential-dependent strategies translate into a soft skip.

use std::{
    sync::{Arc, RwLock},
    time::{Duration, SystemTime},
};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};
use veil::Redact;

use crate::{
    config::Config,
    error::{Error, Result},
    http,
    protocol::spotify::TokenResponse,
    reference::Catalog,
};

/// Spotify's client-credentials exchange endpoint.
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Origin fetched to establish a YouTube session.
const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

/// A Spotify bearer token snapshot.
#[derive(Clone, Redact, PartialEq, Eq)]
pub struct BearerToken {
    #[redact]
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl BearerToken {
    /// Tokens within this margin of expiry are refreshed before use, so
    /// a request never leaves with a token about to lapse mid-flight.
    pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn time_to_live(&self) -> Duration {
        self.expires_at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the token should be re-acquired before the next request.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.time_to_live() <= Self::EXPIRY_MARGIN
    }
}

/// A YouTube cookie jar snapshot.
///
/// Cookies are carried as a preformatted `Cookie` header value rather
/// than a mutable jar, so snapshots stay immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieJar {
    /// `"name=value; name2=value2"`, or `None` when the bootstrap
    /// response set no cookies.
    pub header: Option<String>,
    pub established_at: SystemTime,
}

/// A credential snapshot for one catalog.
#[derive(Clone, Debug)]
pub enum Credential {
    Bearer(Arc<BearerToken>),
    Cookies(Arc<CookieJar>),
}

impl Credential {
    /// The bearer token, if this is a bearer credential.
    #[must_use]
    pub fn bearer(&self) -> Option<&BearerToken> {
        match self {
            Self::Bearer(token) => Some(token),
            Self::Cookies(_) => None,
        }
    }

    /// The `Cookie` header value, if any cookies were captured.
    #[must_use]
    pub fn cookie_header(&self) -> Option<&str> {
        match self {
            Self::Bearer(_) => None,
            Self::Cookies(jar) => jar.header.as_deref(),
        }
    }
}

/// Holds one session per catalog, refreshed on demand.
pub struct SessionStore {
    config: Config,
    http_client: Arc<http::Client>,

    spotify: RwLock<Option<Arc<BearerToken>>>,
    spotify_refresh: tokio::sync::Mutex<()>,

    youtube: RwLock<Option<Arc<CookieJar>>>,
    youtube_refresh: tokio::sync::Mutex<()>,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: Config, http_client: Arc<http::Client>) -> Self {
        Self {
            config,
            http_client,
            spotify: RwLock::new(None),
            spotify_refresh: tokio::sync::Mutex::new(()),
            youtube: RwLock::new(None),
            youtube_refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns a valid credential snapshot for the catalog, refreshing
    /// it first if missing or about to expire.
    pub async fn credential(&self, catalog: Catalog) -> Result<Credential> {
        match catalog {
            Catalog::Spotify => Ok(Credential::Bearer(self.spotify_token(false).await?)),
            Catalog::YouTube => Ok(Credential::Cookies(self.youtube_cookies(false).await?)),
        }
    }

    /// Discards the current snapshot for the catalog and establishes a
    /// new one. In-flight requests keep the old snapshot.
    pub async fn force_refresh(&self, catalog: Catalog) -> Result<Credential> {
        debug!("forcing credential refresh for {catalog}");
        match catalog {
            Catalog::Spotify => Ok(Credential::Bearer(self.spotify_token(true).await?)),
            Catalog::YouTube => Ok(Credential::Cookies(self.youtube_cookies(true).await?)),
        }
    }

    async fn spotify_token(&self, force: bool) -> Result<Arc<BearerToken>> {
        let observed = self
            .spotify
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        if !force {
            if let Some(ref token) = observed {
                if !token.needs_refresh() {
                    return Ok(Arc::clone(token));
                }
            }
        }

        let _refresh = self.spotify_refresh.lock().await;

        // Another caller may have refreshed while we waited for the
        // lock; concurrent refreshes collapse into one exchange.
        let current = self
            .spotify
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        if let Some(ref token) = current {
            let already_refreshed = match observed {
                Some(ref observed) => !Arc::ptr_eq(token, observed),
                None => true,
            };
            if already_refreshed && !token.needs_refresh() {
                return Ok(Arc::clone(token));
            }
        }

        let token = Arc::new(self.exchange_spotify_credentials().await?);
        info!(
            "spotify token acquired, time to live: {} seconds",
            token.time_to_live().as_secs()
        );

        *self
            .spotify
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Arc::clone(&token));

        Ok(token)
    }

    /// Performs the client-credentials exchange.
    async fn exchange_spotify_credentials(&self) -> Result<BearerToken> {
        let (Some(client_id), Some(client_secret)) = (
            self.config.spotify_client_id.as_deref(),
            self.config.spotify_client_secret.as_deref(),
        ) else {
            return Err(Error::unavailable("spotify credentials not configured"));
        };

        let basic = BASE64.encode(format!("{client_id}:{client_secret}"));
        let url = SPOTIFY_TOKEN_URL.parse::<reqwest::Url>()?;

        let mut request = self.http_client.post(url, "grant_type=client_credentials");
        let headers = request.headers_mut();
        headers.try_insert(
            AUTHORIZATION,
            format!("Basic {basic}").parse().map_err(Error::from)?,
        )?;
        headers.try_insert(CONTENT_TYPE, http::Client::FORM_URLENCODED_CONTENT)?;

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::from(status));
        }

        let token = response.json::<TokenResponse>().await?;
        Ok(BearerToken {
            access_token: token.access_token,
            expires_at: SystemTime::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn youtube_cookies(&self, force: bool) -> Result<Arc<CookieJar>> {
        let observed = self
            .youtube
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        if !force {
            if let Some(jar) = observed {
                return Ok(jar);
            }
        }

        let _refresh = self.youtube_refresh.lock().await;

        let current = self
            .youtube
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        if let Some(ref jar) = current {
            let already_refreshed = match observed {
                Some(ref observed) => !Arc::ptr_eq(jar, observed),
                None => true,
            };
            if already_refreshed {
                return Ok(Arc::clone(jar));
            }
        }

        let jar = Arc::new(self.bootstrap_youtube_session().await?);

        *self
            .youtube
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Arc::clone(&jar));

        Ok(jar)
    }

    /// Establishes a YouTube session by fetching the origin page and
    /// capturing its `Set-Cookie` headers into a snapshot.
    async fn bootstrap_youtube_session(&self) -> Result<CookieJar> {
        let url = YOUTUBE_ORIGIN.parse::<reqwest::Url>()?;
        let request = self.http_client.get(url, "");
        let response = self.http_client.execute(request).await?;

        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(cookie_pair)
            .collect();

        debug!("youtube session established with {} cookies", cookies.len());

        Ok(CookieJar {
            header: format_cookie_header(&cookies),
            established_at: SystemTime::now(),
        })
    }
}

/// Extracts the `name=value` pair from a `Set-Cookie` header value,
/// discarding attributes like `Path` and `Expires`.
fn cookie_pair(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    if pair.split_once('=').is_some_and(|(name, _)| !name.is_empty()) {
        Some(pair.to_owned())
    } else {
        None
    }
}

/// Joins cookie pairs into a `Cookie` header value.
fn format_cookie_header(pairs: &[String]) -> Option<String> {
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
