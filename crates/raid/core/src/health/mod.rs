//! Health bookkeeping for the shared pool and each participant's private battle.
mod battle;
mod pool;

pub use battle::BattleHealthCache;
pub use pool::SharedHealthPool;
