//! Threaded host for a `PlayerController`.
//!
//! The controller and its engines stay on one dedicated thread (audio
//! outputs are usually not `Send`). Other threads talk to it through
//! `PlayerCmd`s and read a mirrored copy of its state.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::audio::{AudioEngine, EngineFactory, RodioFactory};
use crate::config::{PlaybackSettings, Settings};
use crate::controller::{PlayerController, PlayerState, StateChange};
use crate::error::{Error, Result};
use crate::library::{self, Direction, Playlist};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCmd {
    /// Play the track at the given index, or replay the current one.
    PlayIndex(Option<usize>),
    Pause,
    /// Resume the current track.
    Play,
    Skip(Direction),
    TogglePlaylist,
    /// Seek to a fraction of the current track.
    Seek(f64),
    /// Stop playback and end the runtime thread.
    Quit,
}

pub type StateHandle = Arc<Mutex<PlayerState>>;

pub struct PlayerRuntime {
    tx: Sender<PlayerCmd>,
    state: StateHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PlayerRuntime {
    /// Build a controller on a new thread and start serving commands.
    ///
    /// `build` runs on the runtime thread; its error is returned here.
    pub fn spawn<F, B>(build: B) -> Result<Self>
    where
        F: EngineFactory + 'static,
        B: FnOnce() -> Result<PlayerController<F>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let state: StateHandle = Arc::new(Mutex::new(PlayerState::default()));

        let state_for_thread = state.clone();
        let handle = thread::spawn(move || {
            let controller = match build() {
                Ok(c) => {
                    let _ = ready_tx.send(Ok(()));
                    c
                }
                Err(e) => {
                    error!(error = %e, "player runtime failed to start");
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            serve(controller, rx, state_for_thread);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                state,
                join: Mutex::new(Some(handle)),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(Error::RuntimeClosed)
            }
        }
    }

    /// Play `playlist` through the default audio output.
    pub fn spawn_rodio(playlist: Playlist, settings: PlaybackSettings) -> Result<Self> {
        Self::spawn(move || {
            let factory = RodioFactory::open_default()?;
            Ok(PlayerController::with_settings(playlist, factory, settings))
        })
    }

    /// Scan `dir` for audio files and play them through the default audio output.
    pub fn from_library(dir: &Path, settings: &Settings) -> Result<Self> {
        let playlist = library::scan(dir, &settings.library);
        Self::spawn_rodio(playlist, settings.playback.clone())
    }

    pub fn state_handle(&self) -> StateHandle {
        self.state.clone()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PlayerState {
        match self.state.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<()> {
        self.tx.send(cmd).map_err(|_| Error::RuntimeClosed)
    }

    /// Stop playback and wait for the runtime thread to exit. Safe to call more than once.
    pub fn shutdown(&self) {
        let _ = self.tx.send(PlayerCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for PlayerRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn serve<F: EngineFactory>(
    mut controller: PlayerController<F>,
    rx: Receiver<PlayerCmd>,
    state: StateHandle,
) {
    if let Ok(mut s) = state.lock() {
        *s = controller.state().clone();
    }
    let mirror = state.clone();
    controller.subscribe(move |change: &StateChange| {
        if let Ok(mut s) = mirror.lock() {
            s.apply(change);
        }
    });

    loop {
        let received = match frame_wait(&controller) {
            Some(interval) => rx.recv_timeout(interval),
            // Nothing to poll; sleep until the next command.
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(PlayerCmd::Quit) => break,
            Ok(cmd) => run_command(&mut controller, cmd),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        controller.on_frame();
    }

    controller.teardown();
    debug!("player runtime stopped");
}

/// How long to wait for a command before the next frame, or `None` to block
/// until one arrives. Frames only matter while an engine is audibly playing.
fn frame_wait<F: EngineFactory>(controller: &PlayerController<F>) -> Option<Duration> {
    controller
        .engine()
        .filter(|engine| engine.is_playing())
        .map(|_| controller.frame_interval())
}

fn run_command<F: EngineFactory>(controller: &mut PlayerController<F>, cmd: PlayerCmd) {
    debug!(?cmd, "player command");
    let result = match cmd {
        PlayerCmd::PlayIndex(i) => controller.play_index(i),
        PlayerCmd::Pause => {
            controller.pause();
            Ok(())
        }
        PlayerCmd::Play => {
            controller.play();
            Ok(())
        }
        PlayerCmd::Skip(direction) => controller.skip(direction),
        PlayerCmd::TogglePlaylist => {
            controller.toggle_playlist();
            Ok(())
        }
        PlayerCmd::Seek(fraction) => controller.seek(fraction),
        PlayerCmd::Quit => Ok(()),
    };
    if let Err(e) = result {
        warn!(error = %e, "player command failed");
    }
}
