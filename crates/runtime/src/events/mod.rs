//! Topic-based event bus for raid events.
//!
//! Every event a session produces is published here after it has been handed to
//! the collaborators, so observers can follow raids without owning a collaborator.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::LifecycleEvent;
