//! piControl - Modular Control Panel Host
//!
//! This crate discovers self-contained feature modules at startup, merges
//! their server-side contributions (HTTP routes, heartbeat providers, named
//! actions) into one running axum service, assembles their client-side
//! contributions into a single JS bundle, and broadcasts aggregated
//! telemetry to every connected realtime client.

pub mod config;
pub mod domain;
pub mod http;
pub mod modules;
pub mod realtime;
pub mod registry;
