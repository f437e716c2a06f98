//! Audio-related small types.
//!
//! Lifecycle events, engine construction options and the per-session event
//! sink handed to each engine.

use std::fmt;
use std::sync::mpsc::Sender;

/// Identifies one playback session. Increases every time a track is started.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Lifecycle events an engine emits.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The source has been opened and is ready to play.
    Load,
    /// Playback started or resumed.
    Play,
    /// The source played to its end.
    End,
    Pause,
    Stop,
    /// A seek completed.
    Seek,
    /// The source could not be opened or decoded.
    LoadError(String),
    /// Playback failed after the source was loaded.
    PlayError(String),
}

/// An event tagged with the session that produced it.
pub type EngineMessage = (SessionId, EngineEvent);

/// Options an engine is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Candidate locators, tried in order.
    pub sources: Vec<String>,
    /// Stream the source instead of loading it fully before playback.
    pub streaming: bool,
}

/// Where an engine sends its lifecycle events.
///
/// Every event carries the session id the sink was created for, so the
/// receiver can drop events from sessions it has already replaced.
#[derive(Debug, Clone)]
pub struct EventSink {
    session: SessionId,
    tx: Sender<EngineMessage>,
}

impl EventSink {
    pub fn new(session: SessionId, tx: Sender<EngineMessage>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Send `event`. A closed receiver means nobody is listening anymore, which is fine.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send((self.session, event));
    }
}
