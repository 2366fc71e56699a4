//! Error types for CIFS stats parsing.

use std::io;

use thiserror::Error;

/// Fatal failures of a single parse call.
///
/// Unknown lines and unparsable counter values are not errors; they are skipped.
#[derive(Error, Debug)]
pub enum CifsError {
    /// The line source failed while being read.
    #[error("error scanning CIFS stats: {0}")]
    Read(#[from] io::Error),

    /// No header counter was recognized, so the input is not a stats dump.
    #[error("error scanning CIFS stats: header is empty")]
    EmptyHeader,
}
