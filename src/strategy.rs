//! Retrieval strategies and the fallback chain driver.
//!
//! Every `(catalog, resource kind)` pair resolves through a statically
//! ordered list of [`Strategy`] implementations. A strategy reports one
//! of four outcomes:
//!
//! * [`Outcome::Matched`]: normalized metadata; the chain stops.
//! * [`Outcome::NotFound`]: the upstream confirmed the resource does
//!   not exist; terminal, later strategies are not consulted.
//! * [`Outcome::Skipped`]: this strategy cannot serve the request
//!   (missing credentials, unsupported kind, malformed response); the
//!   chain moves on.
//! * [`Outcome::Throttled`]: the upstream rejected the request for
//!   rate-limiting or authorization reasons. The driver forces exactly
//!   one credential refresh and retries the same strategy exactly once;
//!   a second throttle is treated as a skip.
//!
//! Strategies are ordered most complete first: a structured API when
//! application credentials are configured, then the semi-official
//! internal API, then unstructured page retrieval as last resort.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    reference::{Catalog, TrackReference},
    session::{Credential, SessionStore},
    track::{ResolvedCollection, TrackMetadata},
};

/// A successfully resolved reference.
#[derive(Clone, Debug)]
pub enum Resolved {
    Track(TrackMetadata),
    Collection(ResolvedCollection),
}

/// Result of one strategy attempt.
#[derive(Debug)]
pub enum Outcome {
    /// The strategy produced a normalized result.
    Matched(Resolved),
    /// The upstream confirmed the resource does not exist.
    NotFound,
    /// Soft failure: try the next strategy. Carries the reason for
    /// diagnostics.
    Skipped(String),
    /// Transient failure: rate limiting or stale authorization.
    Throttled(Error),
}

impl Outcome {
    /// Classifies an error from a strategy's request path: transient
    /// rejections become [`Outcome::Throttled`], upstream-confirmed
    /// absence becomes [`Outcome::NotFound`], everything else is a soft
    /// skip so the chain can fall back.
    #[must_use]
    pub fn from_error(error: Error) -> Self {
        if error.is_transient() {
            Self::Throttled(error)
        } else if error.kind == crate::error::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Skipped(error.to_string())
        }
    }
}

/// One concrete retrieval technique for a catalog.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Attempts to resolve the reference. Must not panic on malformed
    /// upstream data; report it as a skip instead.
    async fn attempt(&self, reference: &TrackReference) -> Outcome;
}

/// Seam for forcing credential refreshes, so the driver can be
/// exercised without upstream calls.
#[async_trait]
pub trait SessionControl: Send + Sync {
    async fn refresh(&self, catalog: Catalog) -> Result<Credential>;
}

#[async_trait]
impl SessionControl for SessionStore {
    async fn refresh(&self, catalog: Catalog) -> Result<Credential> {
        self.force_refresh(catalog).await
    }
}

/// An ordered chain of strategies for one catalog.
pub struct StrategyChain {
    catalog: Catalog,
    strategies: Vec<Box<dyn Strategy>>,
    sessions: Arc<dyn SessionControl>,
}

impl StrategyChain {
    #[must_use]
    pub fn new(
        catalog: Catalog,
        strategies: Vec<Box<dyn Strategy>>,
        sessions: Arc<dyn SessionControl>,
    ) -> Self {
        Self {
            catalog,
            strategies,
            sessions,
        }
    }

    /// Resolves a reference by attempting each strategy in order. The
    /// first success wins; exhaustion is a terminal "unavailable"
    /// failure carrying the last strategy's cause.
    pub async fn resolve(&self, reference: &TrackReference) -> Result<Resolved> {
        let mut last_cause: Option<Error> = None;

        for strategy in &self.strategies {
            match strategy.attempt(reference).await {
                Outcome::Matched(resolved) => {
                    debug!("{} resolved {reference}", strategy.name());
                    return Ok(resolved);
                }
                Outcome::NotFound => {
                    return Err(Error::not_found(format!("{reference} does not exist")));
                }
                Outcome::Skipped(reason) => {
                    debug!("{} skipped {reference}: {reason}", strategy.name());
                    last_cause = Some(Error::unavailable(reason));
                }
                Outcome::Throttled(cause) => {
                    warn!("{} throttled on {reference}: {cause}", strategy.name());

                    // Exactly one forced refresh and one retry of the
                    // same strategy; a second throttle is treated as a
                    // soft failure.
                    match self.sessions.refresh(self.catalog).await {
                        Ok(_) => match strategy.attempt(reference).await {
                            Outcome::Matched(resolved) => {
                                debug!("{} resolved {reference} after refresh", strategy.name());
                                return Ok(resolved);
                            }
                            Outcome::NotFound => {
                                return Err(Error::not_found(format!(
                                    "{reference} does not exist"
                                )));
                            }
                            Outcome::Skipped(reason) => {
                                debug!(
                                    "{} skipped {reference} after refresh: {reason}",
                                    strategy.name()
                                );
                                last_cause = Some(Error::unavailable(reason));
                            }
                            Outcome::Throttled(cause) => {
                                warn!(
                                    "{} throttled again on {reference}, moving on",
                                    strategy.name()
                                );
                                last_cause = Some(cause);
                            }
                        },
                        Err(refresh_error) => {
                            warn!(
                                "credential refresh for {} failed: {refresh_error}",
                                self.catalog
                            );
                            last_cause = Some(cause);
                        }
                    }
                }
            }
        }

        let cause = last_cause
            .map_or_else(|| "no strategies configured".to_owned(), |e| e.to_string());
        Err(Error::unavailable(format!(
            "could not load {reference}: {cause}"
        )))
    }
}
