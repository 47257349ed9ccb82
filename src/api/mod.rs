//! HTTP API
//!
//! - `middleware`: request id
//! - `services`: route handlers (shorten / redirect / stats / health)

pub mod middleware;
pub mod services;
