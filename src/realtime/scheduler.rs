//! The periodic heartbeat broadcast scheduler.
//!
//! One tokio task, one fixed-period timer, started once after the registry
//! load completes. Each tick either short-circuits (no providers or no
//! connections) or runs every provider against the shared sample in
//! registration order, stamps `time`, and fans the sample out to the whole
//! connection set. A failing provider aborts that tick's broadcast for all
//! clients; no partial heartbeat is ever sent.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::HeartbeatSample;
use crate::registry::ModuleRegistry;

use super::connections::ConnectionSet;
use super::messages::ServerMessage;

pub struct HeartbeatScheduler {
    registry: Arc<ModuleRegistry>,
    connections: Arc<ConnectionSet>,
    period: Duration,
    /// Shared mutable sample, reused across providers and across ticks.
    /// Only this scheduler ever writes it.
    beat: HeartbeatSample,
    /// Last stamped `time`, used to keep stamps non-decreasing under clock
    /// steps.
    last_time: i64,
}

impl HeartbeatScheduler {
    pub fn new(
        registry: Arc<ModuleRegistry>,
        connections: Arc<ConnectionSet>,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            connections,
            period,
            beat: HeartbeatSample::new(),
            last_time: 0,
        }
    }

    /// Starts the timer task for the life of the process.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(period_ms = self.period.as_millis() as u64, "heartbeat scheduler started");
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Runs one scheduler pass. Returns whether a broadcast went out.
    pub async fn tick(&mut self) -> bool {
        let providers = self.registry.providers();
        if providers.is_empty() || self.connections.count().await == 0 {
            // nothing to send or nobody to send to
            return false;
        }

        for provider in providers {
            if let Err(error) = provider.apply(&mut self.beat) {
                warn!(
                    module = %provider.module(),
                    %error,
                    "heartbeat provider failed, skipping this tick's broadcast"
                );
                return false;
            }
        }

        let now = Utc::now().timestamp_millis().max(self.last_time);
        self.last_time = now;
        self.beat.stamp(now);

        let delivered = self
            .connections
            .broadcast(&ServerMessage::Heartbeat(self.beat.clone()))
            .await;
        debug!(delivered, time = now, "heartbeat broadcast");
        true
    }
}
