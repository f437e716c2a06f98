//! Player controller: observable state plus the operations a playlist UI binds to.
//!
//! State lives in an owned [`PlayerState`]; every field change is announced
//! to subscribed [`StateObserver`]s as a typed [`StateChange`].

mod observer;
mod player;
mod state;
mod ticker;

pub use observer::{StateObserver, SubscriptionId};
pub use player::PlayerController;
pub use state::{PlaybackError, PlayerState, StateChange};
pub use ticker::ProgressTicker;
