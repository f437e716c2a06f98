use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{
    AudioEngine, EngineEvent, EngineFactory, EngineMessage, EngineOptions, EventSink, SessionId,
};
use crate::config::PlaybackSettings;
use crate::error::{Error, Result};
use crate::library::{Direction, Playlist};

use super::observer::{Observers, StateObserver, SubscriptionId};
use super::state::{PlaybackError, PlayerState};
use super::ticker::ProgressTicker;

/// The live binding between one track and one engine.
struct PlaybackSession<E> {
    id: SessionId,
    index: usize,
    engine: E,
}

/// Owns the player state and at most one playback session.
///
/// Every public operation runs synchronously and then dispatches whatever
/// lifecycle events the engine has emitted so far, so the state read right
/// after a call already reflects it. Events from a session that has since
/// been replaced are dropped.
pub struct PlayerController<F: EngineFactory> {
    playlist: Playlist,
    factory: F,
    settings: PlaybackSettings,
    state: PlayerState,
    session: Option<PlaybackSession<F::Engine>>,
    next_session: u64,
    events_tx: Sender<EngineMessage>,
    events_rx: Receiver<EngineMessage>,
    ticker: ProgressTicker,
    observers: Observers,
}

impl<F: EngineFactory> PlayerController<F> {
    pub fn new(playlist: Playlist, factory: F) -> Self {
        Self::with_settings(playlist, factory, PlaybackSettings::default())
    }

    pub fn with_settings(playlist: Playlist, factory: F, settings: PlaybackSettings) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let ticker = ProgressTicker::new(settings.frame_interval());
        Self {
            playlist,
            factory,
            settings,
            state: PlayerState::default(),
            session: None,
            next_session: 0,
            events_tx,
            events_rx,
            ticker,
            observers: Observers::default(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Engine of the live session, if any.
    pub fn engine(&self) -> Option<&F::Engine> {
        self.session.as_ref().map(|s| &s.engine)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// How often progress is refreshed while playing.
    pub fn frame_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Whether progress polling is currently active.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn subscribe(&mut self, observer: impl StateObserver + 'static) -> SubscriptionId {
        self.observers.add(Box::new(observer))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    /// Start playing the track at `index`, or at the current index when `None`.
    ///
    /// Any live session is stopped first. An out-of-range index leaves the
    /// state untouched.
    pub fn play_index(&mut self, index: Option<usize>) -> Result<()> {
        let index = index.unwrap_or(self.state.current_index);
        let result = self.start_track(index);
        self.dispatch_events();
        result
    }

    pub fn pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.engine.pause();
        }
        self.dispatch_events();
    }

    /// Resume the live session. No-op when nothing is loaded or it is already playing.
    pub fn play(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if !session.engine.is_playing() {
                session.engine.play();
            }
        }
        self.dispatch_events();
    }

    /// Move one track forward or back, wrapping around the playlist.
    pub fn skip(&mut self, direction: Direction) -> Result<()> {
        let result = self.advance(direction);
        self.dispatch_events();
        result
    }

    pub fn toggle_playlist(&mut self) {
        self.update(|s| s.show_playlist = !s.show_playlist);
    }

    /// Seek the live session to `fraction` of its length.
    ///
    /// `fraction` is clamped to `[0, 1]`; NaN and infinities are rejected.
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            return Err(Error::InvalidSeek(fraction));
        }
        if let Some(session) = self.session.as_mut() {
            let target = session.engine.duration() * fraction.clamp(0.0, 1.0);
            debug!(fraction, target, session = %session.id, "seek");
            session.engine.seek(target);
        }
        self.dispatch_events();
        Ok(())
    }

    /// One display-refresh tick at the current time.
    pub fn on_frame(&mut self) {
        self.tick(Instant::now());
    }

    /// One display-refresh tick at `now`: poll the engine, dispatch its
    /// events, and refresh progress if the ticker is due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.engine.poll();
        }
        self.dispatch_events();
        if self.ticker.due(now) {
            self.update_progress();
        }
    }

    /// Stop and release the live session. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.release_session();
        self.update(|s| {
            s.is_playing = false;
            s.is_paused = false;
            s.is_loading = false;
        });
        // Whatever the stopped engine emitted is stale now.
        self.dispatch_events();
    }

    /// Drain queued engine events, applying those from the live session.
    pub fn dispatch_events(&mut self) {
        while let Ok((id, event)) = self.events_rx.try_recv() {
            if self.session_id() != Some(id) {
                debug!(session = %id, ?event, "dropping event from released session");
                continue;
            }
            self.handle_event(event);
        }
    }

    fn advance(&mut self, direction: Direction) -> Result<()> {
        let next = self
            .playlist
            .step(self.state.current_index, direction)
            .ok_or(Error::EmptyPlaylist)?;
        self.start_track(next)
    }

    fn start_track(&mut self, index: usize) -> Result<()> {
        let Some(track) = self.playlist.get(index).cloned() else {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.playlist.len(),
            });
        };

        self.release_session();
        self.update(|s| {
            s.current_track = Some(track.clone());
            s.is_playing = false;
            s.is_paused = false;
            s.duration = None;
            s.current_time = None;
            s.progress = 0.0;
            s.error = None;
        });

        let id = SessionId(self.next_session);
        self.next_session += 1;
        let options = EngineOptions {
            sources: vec![track.url.clone()],
            streaming: self.settings.force_streaming,
        };

        match self.factory.create(options, EventSink::new(id, self.events_tx.clone())) {
            Ok(mut engine) => {
                engine.play();
                self.session = Some(PlaybackSession { id, index, engine });
                self.update(|s| s.current_index = index);
                info!(index, title = %track.title, session = %id, "playing track");
                Ok(())
            }
            Err(e) => {
                warn!(index, url = %track.url, error = %e, "cannot start track");
                let error = PlaybackError {
                    url: track.url.clone(),
                    message: e.to_string(),
                };
                // Keep the index so skipping moves past the broken track.
                self.update(|s| {
                    s.current_index = index;
                    s.is_loading = false;
                    s.error = Some(error);
                });
                Err(e)
            }
        }
    }

    fn release_session(&mut self) {
        self.ticker.stop();
        if let Some(mut old) = self.session.take() {
            debug!(session = %old.id, index = old.index, "releasing session");
            old.engine.stop();
        }
    }

    fn handle_event(&mut self, event: EngineEvent) {
        debug!(?event, "engine event");
        match event {
            EngineEvent::Load => self.update(|s| s.is_loading = true),
            EngineEvent::Play => {
                let secs = self.session.as_ref().map_or(0.0, |s| s.engine.duration());
                let duration = (secs.is_finite() && secs.round() >= 1.0).then(|| secs.round() as u64);
                self.update(|s| {
                    s.duration = duration;
                    if duration.is_none() {
                        s.progress = 0.0;
                    }
                    s.is_playing = true;
                    s.is_paused = false;
                    s.is_loading = false;
                });
                self.ticker.start();
                self.update_progress();
            }
            EngineEvent::End => {
                if let Err(e) = self.advance(Direction::Next) {
                    warn!(error = %e, "auto-advance failed");
                }
            }
            EngineEvent::Pause => {
                self.ticker.stop();
                self.update(|s| {
                    s.is_playing = false;
                    s.is_paused = true;
                });
            }
            EngineEvent::Stop => {
                self.ticker.stop();
                self.update(|s| {
                    s.is_playing = false;
                    s.is_paused = false;
                });
            }
            EngineEvent::Seek => self.update_progress(),
            EngineEvent::LoadError(message) | EngineEvent::PlayError(message) => {
                warn!(%message, "playback failed");
                self.ticker.stop();
                let url = self
                    .state
                    .current_track
                    .as_ref()
                    .map(|t| t.url.clone())
                    .unwrap_or_default();
                self.update(|s| {
                    s.is_playing = false;
                    s.is_paused = false;
                    s.is_loading = false;
                    s.error = Some(PlaybackError { url, message });
                });
            }
        }
    }

    /// Refresh elapsed time and progress, or stop the ticker when there is
    /// nothing to poll.
    fn update_progress(&mut self) {
        let reading = match (&self.session, self.state.duration) {
            (Some(session), Some(duration)) if duration > 0 && session.engine.is_playing() => {
                Some((session.engine.position(), duration))
            }
            _ => None,
        };

        let Some((elapsed, duration)) = reading else {
            self.ticker.stop();
            return;
        };

        // `max` also maps a NaN reading to zero.
        let elapsed = elapsed.max(0.0);
        let progress = (elapsed / duration as f64 * 100.0).min(100.0);
        self.update(|s| {
            s.current_time = Some(elapsed);
            s.progress = progress;
        });
    }

    /// Mutate the state and notify observers of every field that changed.
    fn update(&mut self, f: impl FnOnce(&mut PlayerState)) {
        let before = self.state.clone();
        f(&mut self.state);
        for change in self.state.changes_since(&before) {
            self.observers.notify(&change);
        }
    }
}

impl<F: EngineFactory> Drop for PlayerController<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
