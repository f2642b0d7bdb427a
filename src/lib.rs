//! Resolves music identifiers from Spotify and YouTube into playable
//! audio stream descriptors.
//!
//! Spotify holds metadata but cannot serve audio, so Spotify resources
//! are bridged to YouTube by searching for `"{artist} - {title}"` and
//! taking the first match. YouTube resources resolve through an ordered
//! chain of retrieval strategies (Data API, Innertube, page scrape) with
//! fallback on failure and a single credential-refresh retry on
//! rate-limit or authorization rejections.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod reference;
pub mod resolver;
pub mod session;
pub mod spotify;
pub mod strategy;
pub mod stream;
pub mod track;
pub mod util;
pub mod youtube;
