//! High-level runtime orchestrator.
//!
//! The runtime owns the tick worker, wires up the command channel and the event
//! bus, and exposes a builder-based API for hosts to embed raids.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use raid_core::RaidConfig;

use crate::api::{RaidHandle, Result, RuntimeError};
use crate::collaborators::Collaborators;
use crate::director::RaidDirector;
use crate::events::EventBus;
use crate::workers::{Command, TickWorker};

/// Runtime configuration shared across the orchestrator and the worker.
#[derive(Debug, Clone)]
pub struct RaidRuntimeConfig {
    /// One server tick; 50ms gives 20 ticks per second.
    pub tick_interval: Duration,
    /// When false, sessions only advance through [`RaidHandle::advance`].
    pub auto_tick: bool,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
}

impl Default for RaidRuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            auto_tick: true,
            command_buffer_size: 32,
            event_buffer_size: 256,
        }
    }
}

/// Main runtime that drives every raid
///
/// Design: Runtime owns the worker and coordinates shutdown.
/// [`RaidHandle`] provides a cloneable façade for clients.
pub struct RaidRuntime {
    handle: RaidHandle,
    worker_handle: JoinHandle<()>,
}

impl RaidRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RaidRuntimeBuilder {
        RaidRuntimeBuilder::new()
    }

    /// Spawn a runtime with default raid rules.
    pub fn start(config: RaidRuntimeConfig, collaborators: Collaborators) -> Result<Self> {
        Self::builder()
            .config(config)
            .collaborators(collaborators)
            .build()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RaidHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits until every handle clone has been dropped; the worker then stops any
    /// raid still running.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`RaidRuntime`].
pub struct RaidRuntimeBuilder {
    config: RaidRuntimeConfig,
    raid_config: RaidConfig,
    collaborators: Option<Collaborators>,
}

impl RaidRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RaidRuntimeConfig::default(),
            raid_config: RaidConfig::default(),
            collaborators: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RaidRuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Raid rules: durations, tiers, reward sync.
    pub fn raid_config(mut self, raid_config: RaidConfig) -> Self {
        self.raid_config = raid_config;
        self
    }

    /// Display, combat engine, rewards and world. Defaults to
    /// [`Collaborators::logging`].
    pub fn collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = Some(collaborators);
        self
    }

    /// Build the runtime and spawn its worker. Must be called inside a tokio runtime.
    pub fn build(self) -> Result<RaidRuntime> {
        self.raid_config.validate()?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RaidHandle::new(command_tx, bus.clone());

        let collaborators = self.collaborators.unwrap_or_else(Collaborators::logging);
        let director = RaidDirector::new(self.raid_config, collaborators, bus);
        let tick_interval = self.config.auto_tick.then_some(self.config.tick_interval);
        let worker = TickWorker::new(director, command_rx, tick_interval);

        info!(
            target: "raid::director",
            auto_tick = self.config.auto_tick,
            interval_ms = self.config.tick_interval.as_millis() as u64,
            "Starting raid runtime"
        );
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(RaidRuntime {
            handle,
            worker_handle,
        })
    }
}
