//! Linklens - deterministic URL shortener with AI link insights
//!
//! Short codes are derived from the URL itself (MD5 hex prefix), so shortening
//! the same URL twice yields the same code. Every redirect increments a visit
//! counter, and every shorten schedules a background analysis that attaches a
//! category and a one-line summary to the link.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `storage`: key-value backends (Redis / in-memory), URL store, insight cache
//! - `services`: analytics engine and AI enrichment dispatcher
//! - `api`: HTTP services and middleware
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
