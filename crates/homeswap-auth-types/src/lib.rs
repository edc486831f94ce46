//! Auth types shared across Homeswap services.
//!
//! Provides the bearer-token codec and `Authorization` header parsing.

pub mod bearer;
pub mod token;
