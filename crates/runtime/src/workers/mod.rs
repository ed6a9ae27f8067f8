//! Worker tasks that back the runtime orchestration.
//!
//! The tick worker owns the [`RaidDirector`](crate::director::RaidDirector) and
//! serializes engine callbacks, admin commands and server ticks.

mod tick;

pub use tick::{Command, TickWorker};
