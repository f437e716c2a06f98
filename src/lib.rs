//! Playlist playback controller.
//!
//! `PlayerController` owns the observable player state for a playlist widget
//! and drives one `AudioEngine` per track. `PlayerRuntime` hosts a controller
//! on its own thread when the caller wants a command channel instead of
//! direct method calls.

pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod library;
pub mod runtime;

pub use audio::{AudioEngine, EngineEvent, EngineFactory, EngineOptions, EventSink, SessionId};
pub use controller::{
    PlaybackError, PlayerController, PlayerState, StateChange, StateObserver, SubscriptionId,
};
pub use error::{Error, Result};
pub use library::{Direction, Playlist, Track};
pub use runtime::{PlayerCmd, PlayerRuntime, StateHandle};
