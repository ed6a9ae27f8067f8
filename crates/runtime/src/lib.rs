//! Runtime orchestration for shared boss raids.
//!
//! This crate wires the `raid-core` coordinators to the systems they drive: the
//! display, the combat engine, the reward system and the entity world. Hosts embed
//! [`RaidRuntime`] and talk to it through [`RaidHandle`], or own a
//! [`RaidDirector`] directly when they already serialize calls themselves.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the handle and error types
//! - [`director`] and [`registry`] own the sessions
//! - [`adapter`] turns combat-engine health reports into session calls
//! - [`collaborators`] defines the outbound interfaces and their dispatch
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`admin`] validates operator input
pub mod adapter;
pub mod admin;
pub mod api;
pub mod collaborators;
pub mod director;
pub mod events;
pub mod registry;
pub mod runtime;

mod workers;

pub use adapter::{CombatEvent, CombatEventKind, FaintVerdict, parse_health};
pub use admin::StartRequest;
pub use api::{CollaboratorError, RaidHandle, Result, RuntimeError};
pub use collaborators::{
    ActorWorld, BattleGateway, CollaboratorResult, Collaborators, DispatchCriticality,
    Dispatcher, DisplaySink, InMemoryWorld, Location, LogSink, MemoryBoss, RewardGranter,
};
pub use director::RaidDirector;
pub use events::{Event, EventBus, LifecycleEvent, Topic};
pub use registry::{SessionEntry, SessionRegistry};
pub use runtime::{RaidRuntime, RaidRuntimeBuilder, RaidRuntimeConfig};
