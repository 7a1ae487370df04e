//! Simpleshortener - a small JSON-driven URL shortener service
//!
//! The short link table is not edited through an API: it is loaded from a
//! JSON document (local file or remote URL) and periodically re-synced into
//! Redis. Every redirect is counted per day and per user-agent class, with a
//! bounded retention window, and the counters can be read back as a metrics
//! report per target URL or per short token.
//!
//! # Architecture
//! - `source`: loading and validating the short link source document
//! - `storage`: mapping and statistics store traits, Redis and in-memory backends
//! - `services`: sync, redirect resolution, statistics recording, metrics
//! - `api`: HTTP route handlers
//! - `config`: configuration management
//! - `runtime`: startup wiring and the periodic sync scheduler
//! - `cooldown`: minimum-interval guard for the sync operation

pub mod api;
pub mod config;
pub mod cooldown;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod source;
pub mod storage;
pub mod utils;
