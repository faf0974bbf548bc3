//! State cache, connection registry, and event bridge for the spectate
//! overlay.
//!
//! This crate owns everything between the upstream event source and the
//! observer transport: it turns typed simulation events into outbound
//! messages, keeps the small amount of state a late joiner needs, and
//! fans messages out to a dynamic set of observer channels.
//!
//! # Modules
//!
//! - [`cache`] -- [`StateCache`]: focused player, roster, round flag.
//! - [`channel`] -- [`ObserverChannel`] trait and the queue-backed
//!   [`QueuedChannel`].
//! - [`registry`] -- [`ConnectionRegistry`]: live channel set with
//!   prune-on-broadcast.
//! - [`broadcaster`] -- [`Broadcaster`]: serialize once, deliver to all.
//! - [`source`] -- [`EventSource`] trait, event decoding, and the
//!   in-process [`MemorySource`].
//! - [`bridge`] -- [`EventBridge`]: per-event handlers and connection
//!   acceptance.
//! - [`runner`] -- The single-task bridge loop and its [`BridgeHandle`].
//! - [`config`] -- Configuration loading from `overlay-config.yaml`.
//!
//! # Concurrency
//!
//! All bridge state lives inside one task driven by [`runner::run_bridge`].
//! Upstream events and connection commands are processed one at a time,
//! so the cache and registry need no locks.
//!
//! [`StateCache`]: cache::StateCache
//! [`ObserverChannel`]: channel::ObserverChannel
//! [`QueuedChannel`]: channel::QueuedChannel
//! [`ConnectionRegistry`]: registry::ConnectionRegistry
//! [`Broadcaster`]: broadcaster::Broadcaster
//! [`EventSource`]: source::EventSource
//! [`MemorySource`]: source::MemorySource
//! [`EventBridge`]: bridge::EventBridge
//! [`BridgeHandle`]: runner::BridgeHandle

pub mod bridge;
pub mod broadcaster;
pub mod cache;
pub mod channel;
pub mod config;
pub mod registry;
pub mod runner;
pub mod source;
