//! # Middleware Modules
//!
//! Tower layers wrapped around every route.

pub mod metrics;
pub mod panic;
pub mod tracing_layer;
