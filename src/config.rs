//! Engine configuration.
//!
//! Application credentials are explicit configuration values, not
//! implicit globals: a [`Config`] with no credentials at all is a
//! normal, supported state in which the credential-dependent retrieval
//! strategies are simply skipped.

use std::{fs, io, time::Duration};

use serde::Deserialize;

/// Configuration for the resolution engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Application name reported in the `User-Agent` header.
    pub app_name: String,

    /// Application version reported in the `User-Agent` header.
    pub app_version: String,

    /// Complete `User-Agent` header value.
    pub user_agent: String,

    /// Spotify application client id for the client-credentials
    /// exchange. `None` disables the Spotify Web API strategy.
    pub spotify_client_id: Option<String>,

    /// Spotify application client secret.
    pub spotify_client_secret: Option<String>,

    /// YouTube Data API key. `None` disables the Data API strategy;
    /// resolution then starts at the Innertube strategy.
    pub youtube_api_key: Option<String>,

    /// Timeout applied to every upstream request. Timeouts are treated
    /// as transient failures for retry purposes.
    pub request_timeout: Duration,
}

/// On-disk shape of the secrets file.
#[derive(Clone, Debug, Default, Deserialize)]
struct Secrets {
    spotify_client_id: Option<String>,
    spotify_client_secret: Option<String>,
    youtube_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let app_name = env!("CARGO_PKG_NAME").to_owned();
        let app_version = env!("CARGO_PKG_VERSION").to_owned();
        let user_agent = format!("{app_name}/{app_version} (Rust; {})", std::env::consts::OS);

        Self {
            app_name,
            app_version,
            user_agent,
            spotify_client_id: None,
            spotify_client_secret: None,
            youtube_api_key: None,
            request_timeout: Self::REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Default per-request timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Secrets file should be small; anything larger is malformed.
    const SECRETS_MAX_SIZE: u64 = 4096;

    /// Loads credentials from a TOML secrets file into a default
    /// configuration.
    ///
    /// All keys are optional:
    ///
    /// ```toml
    /// spotify_client_id = "..."
    /// spotify_client_secret = "..."
    /// youtube_api_key = "..."
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is unreasonably
    /// large, or is not valid TOML.
    pub fn from_secrets_file(path: &str) -> io::Result<Self> {
        // Prevent out-of-memory condition: the secrets file should be small.
        let attributes = fs::metadata(path)?;
        if attributes.len() > Self::SECRETS_MAX_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{path} is too large"),
            ));
        }

        let contents = fs::read_to_string(path)?;
        let secrets: Secrets = toml::from_str(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{path} format is invalid: {e}"),
            )
        })?;

        Ok(Self {
            spotify_client_id: secrets.spotify_client_id,
            spotify_client_secret: secrets.spotify_client_secret,
            youtube_api_key: secrets.youtube_api_key,
            ..Self::default()
        })
    }

    /// Whether Spotify application credentials are configured.
    #[must_use]
    pub fn has_spotify_credentials(&self) -> bool {
        self.spotify_client_id.is_some() && self.spotify_client_secret.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_credentials() {
        let config = Config::default();
        assert!(!config.has_spotify_credentials());
        assert!(config.youtube_api_key.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn user_agent_contains_name_and_version() {
        let config = Config::default();
        assert!(config.user_agent.contains(&config.app_name));
        assert!(config.user_agent.contains(&config.app_version));
    }

    #[test]
    fn secrets_parse_with_partial_keys() {
        let secrets: Secrets = toml::from_str("youtube_api_key = \"abc\"").unwrap();
        assert_eq!(secrets.youtube_api_key.as_deref(), Some("abc"));
        assert!(secrets.spotify_client_id.is_none());
    }
}
