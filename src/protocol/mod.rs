//! Wire formats of the upstream catalog APIs.
//!
//! These are deserialization targets only; the engine never round-trips
//! upstream payloads. Fields the engine does not read are omitted so
//! schema drift in unrelated parts of a response cannot break parsing.

pub mod spotify;
pub mod youtube;
