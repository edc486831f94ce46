//! Service plumbing shared by Homeswap binaries: tracing setup, request-id
//! and trace layers, health probes, and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
