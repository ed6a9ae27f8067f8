//! Scripted boss behaviour: the effect catalog and the per-session trigger table.
//!
//! Scripts are authored as `key => effect name` pairs. Keys are either
//! `turn:N` (fires into the battle that reaches turn `N`) or `hp:R` (fires into every
//! battle once the shared pool ratio drops to `R` or below).
mod effect;
mod table;

pub use effect::{Cheer, ScriptEffect, Side, Stat, Terrain, UnknownEffect, Weather};
pub use table::{ScriptError, ScriptTable, ScriptTrigger};
