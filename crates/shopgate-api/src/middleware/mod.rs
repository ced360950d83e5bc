//! # Middleware
//!
//! Tower layers shared by the gateway router. The access gate lives in
//! [`crate::gate`].

pub mod tracing_layer;
