//! Scripted in-memory engine used by tests.
//!
//! Each engine shares its state with a [`FakeHandle`] so a test can inspect
//! the calls it received and drive the events a real engine would emit.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};

use super::engine::{AudioEngine, EngineFactory};
use super::types::{EngineEvent, EngineOptions, EventSink};

#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Play,
    Pause,
    Stop,
    Seek(f64),
}

#[derive(Debug)]
pub struct FakeState {
    pub options: EngineOptions,
    pub calls: Vec<FakeCall>,
    pub playing: bool,
    pub stopped: bool,
    pub duration: f64,
    pub position: f64,
    pub polls: usize,
}

#[derive(Clone)]
pub struct FakeHandle {
    pub state: Rc<RefCell<FakeState>>,
    events: EventSink,
}

impl FakeHandle {
    pub fn url(&self) -> String {
        self.state.borrow().options.sources[0].clone()
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.state.borrow().calls.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.borrow().stopped
    }

    pub fn set_position(&self, secs: f64) {
        self.state.borrow_mut().position = secs;
    }

    /// Play to the end of the source.
    pub fn finish(&self) {
        {
            let mut s = self.state.borrow_mut();
            s.playing = false;
            s.position = s.duration;
        }
        self.events.emit(EngineEvent::End);
    }

    /// Emit a raw event, as a misbehaving or late engine would.
    pub fn emit(&self, event: EngineEvent) {
        self.events.emit(event);
    }
}

/// Engine that only records what it was asked to do.
pub struct FakeEngine {
    state: Rc<RefCell<FakeState>>,
    events: EventSink,
}

impl AudioEngine for FakeEngine {
    fn play(&mut self) {
        let mut s = self.state.borrow_mut();
        s.calls.push(FakeCall::Play);
        if s.stopped {
            return;
        }
        s.playing = true;
        drop(s);
        self.events.emit(EngineEvent::Play);
    }

    fn pause(&mut self) {
        let mut s = self.state.borrow_mut();
        s.calls.push(FakeCall::Pause);
        s.playing = false;
        drop(s);
        self.events.emit(EngineEvent::Pause);
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.calls.push(FakeCall::Stop);
        s.playing = false;
        s.stopped = true;
        drop(s);
        self.events.emit(EngineEvent::Stop);
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn position(&self) -> f64 {
        self.state.borrow().position
    }

    fn seek(&mut self, secs: f64) {
        let mut s = self.state.borrow_mut();
        s.calls.push(FakeCall::Seek(secs));
        s.position = secs;
        drop(s);
        self.events.emit(EngineEvent::Seek);
    }

    fn poll(&mut self) {
        self.state.borrow_mut().polls += 1;
    }
}

/// Hands out [`FakeEngine`]s and keeps a handle to every one it created.
pub struct FakeFactory {
    pub duration: f64,
    /// URLs whose engines fail to construct.
    pub broken_urls: Vec<String>,
    pub created: Rc<RefCell<Vec<FakeHandle>>>,
}

impl FakeFactory {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            broken_urls: Vec::new(),
            created: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Shared view of created engines that stays valid after the factory moves into a controller.
    pub fn engines(&self) -> Rc<RefCell<Vec<FakeHandle>>> {
        self.created.clone()
    }
}

impl EngineFactory for FakeFactory {
    type Engine = FakeEngine;

    fn create(&mut self, options: EngineOptions, events: EventSink) -> Result<FakeEngine> {
        if options.sources.iter().any(|s| self.broken_urls.contains(s)) {
            return Err(Error::Engine(format!("cannot open {:?}", options.sources)));
        }

        let state = Rc::new(RefCell::new(FakeState {
            options,
            calls: Vec::new(),
            playing: false,
            stopped: false,
            duration: self.duration,
            position: 0.0,
            polls: 0,
        }));
        self.created.borrow_mut().push(FakeHandle {
            state: state.clone(),
            events: events.clone(),
        });
        events.emit(EngineEvent::Load);
        Ok(FakeEngine { state, events })
    }
}
