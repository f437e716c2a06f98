//! Tracks, playlists and directory scanning.
//!
//! A `Playlist` is fixed once built: callers hand one to the controller and
//! only navigate it afterwards.

mod model;
mod scan;

pub use model::{Direction, Playlist, Track};
pub use scan::scan;
