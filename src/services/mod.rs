//! Service layer for business logic
//!
//! This module provides unified business logic that can be shared between
//! different interfaces (HTTP API, CLI).

mod analytics_service;
pub mod enrichment;

pub use analytics_service::*;
pub use enrichment::{EnrichmentDispatcher, EnrichmentOutcome, EnrichmentSettings};
