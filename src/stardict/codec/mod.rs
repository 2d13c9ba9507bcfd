//! Codec layer for compressed StarDict payloads.
//!
//! # Submodules
//!
//! - [`compression`][]: gzip / dictzip inflation for `.dict.dz` and `.idx.gz`

pub mod compression;
