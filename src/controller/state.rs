use crate::library::Track;

/// Why the current track could not be loaded or played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackError {
    pub url: String,
    pub message: String,
}

/// Everything a player UI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub current_track: Option<Track>,
    pub current_index: usize,
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_loading: bool,
    /// Whole seconds, known once playback starts.
    pub duration: Option<u64>,
    /// Elapsed seconds at the last progress update.
    pub current_time: Option<f64>,
    /// Percent of `duration` played, `0.0` while the duration is unknown.
    pub progress: f64,
    pub show_playlist: bool,
    pub error: Option<PlaybackError>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_track: None,
            current_index: 0,
            is_playing: false,
            is_paused: false,
            is_loading: false,
            duration: None,
            current_time: None,
            progress: 0.0,
            show_playlist: false,
            error: None,
        }
    }
}

/// One field of [`PlayerState`] and its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    CurrentTrack(Option<Track>),
    CurrentIndex(usize),
    Playing(bool),
    Paused(bool),
    Loading(bool),
    Duration(Option<u64>),
    CurrentTime(Option<f64>),
    Progress(f64),
    PlaylistVisible(bool),
    Error(Option<PlaybackError>),
}

impl PlayerState {
    /// Changes that turn `before` into `self`, in field order.
    pub fn changes_since(&self, before: &PlayerState) -> Vec<StateChange> {
        let mut out = Vec::new();
        if self.current_track != before.current_track {
            out.push(StateChange::CurrentTrack(self.current_track.clone()));
        }
        if self.current_index != before.current_index {
            out.push(StateChange::CurrentIndex(self.current_index));
        }
        if self.is_playing != before.is_playing {
            out.push(StateChange::Playing(self.is_playing));
        }
        if self.is_paused != before.is_paused {
            out.push(StateChange::Paused(self.is_paused));
        }
        if self.is_loading != before.is_loading {
            out.push(StateChange::Loading(self.is_loading));
        }
        if self.duration != before.duration {
            out.push(StateChange::Duration(self.duration));
        }
        if self.current_time != before.current_time {
            out.push(StateChange::CurrentTime(self.current_time));
        }
        if self.progress != before.progress {
            out.push(StateChange::Progress(self.progress));
        }
        if self.show_playlist != before.show_playlist {
            out.push(StateChange::PlaylistVisible(self.show_playlist));
        }
        if self.error != before.error {
            out.push(StateChange::Error(self.error.clone()));
        }
        out
    }

    /// Write one change into this state. Used to mirror a controller's state elsewhere.
    pub fn apply(&mut self, change: &StateChange) {
        match change {
            StateChange::CurrentTrack(t) => self.current_track = t.clone(),
            StateChange::CurrentIndex(i) => self.current_index = *i,
            StateChange::Playing(b) => self.is_playing = *b,
            StateChange::Paused(b) => self.is_paused = *b,
            StateChange::Loading(b) => self.is_loading = *b,
            StateChange::Duration(d) => self.duration = *d,
            StateChange::CurrentTime(t) => self.current_time = *t,
            StateChange::Progress(p) => self.progress = *p,
            StateChange::PlaylistVisible(b) => self.show_playlist = *b,
            StateChange::Error(e) => self.error = e.clone(),
        }
    }
}
