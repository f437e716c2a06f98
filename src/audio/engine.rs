use crate::error::Result;

use super::types::{EngineOptions, EventSink};

/// One playing (or playable) audio source.
///
/// Positions and durations are in seconds. Implementations report state
/// changes by emitting events on the [`EventSink`] they were created with,
/// never by calling back into the controller.
pub trait AudioEngine {
    fn play(&mut self);
    fn pause(&mut self);
    /// Halt playback for good. Events emitted after this are ignored by the controller.
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Total length, or `0.0` while unknown.
    fn duration(&self) -> f64;
    /// Current playback position.
    fn position(&self) -> f64;
    fn seek(&mut self, secs: f64);

    /// Called once per frame tick so engines without their own callbacks can
    /// notice state changes such as end of stream.
    fn poll(&mut self) {}
}

/// Creates one engine per track.
pub trait EngineFactory {
    type Engine: AudioEngine;

    fn create(&mut self, options: EngineOptions, events: EventSink) -> Result<Self::Engine>;
}

impl<E: AudioEngine + ?Sized> AudioEngine for Box<E> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn position(&self) -> f64 {
        (**self).position()
    }

    fn seek(&mut self, secs: f64) {
        (**self).seek(secs)
    }

    fn poll(&mut self) {
        (**self).poll()
    }
}
