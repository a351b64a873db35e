//! Error types for warbell.
//!
//! Every failure the engine can surface is one of these variants. None of
//! them leave the state machines half-updated: a rejected command is a no-op.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad settings input; the record was left unchanged.
    #[error("invalid setting: {0}")]
    Validation(String),

    /// A track with this id is already in the catalog.
    #[error("duplicate track id: {0}")]
    DuplicateId(String),

    /// No track with this id exists.
    #[error("track not found: {0}")]
    NotFound(String),

    /// The playback device failed to load or start a source.
    #[error("device error: {0}")]
    Device(String),

    /// A snapshot could not be parsed or applied.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
