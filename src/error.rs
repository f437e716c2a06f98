//! Error types for playdeck.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// `play_index` was given a position outside the playlist.
    #[error("track index {index} out of range for playlist of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Navigation was requested on a playlist with no tracks.
    #[error("playlist is empty")]
    EmptyPlaylist,

    /// Seek fraction was NaN or infinite.
    #[error("invalid seek fraction: {0}")]
    InvalidSeek(f64),

    /// The audio engine could not be created or failed to start.
    #[error("audio engine error: {0}")]
    Engine(String),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The runtime thread is gone and can no longer accept commands.
    #[error("player runtime is not running")]
    RuntimeClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
