//! Audio engine seam.
//!
//! The controller never decodes audio itself. It asks an [`EngineFactory`]
//! for one [`AudioEngine`] per track and listens to the lifecycle events that
//! engine emits through its [`EventSink`].

mod engine;
mod rodio_engine;
mod types;

pub use engine::{AudioEngine, EngineFactory};
pub use rodio_engine::{RodioEngine, RodioFactory};
pub use types::{EngineEvent, EngineMessage, EngineOptions, EventSink, SessionId};

#[cfg(test)]
pub(crate) mod fake;

#[cfg(test)]
mod tests;
