//! Domain types shared across Homeswap services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod badge;
pub mod exchange;
pub mod otp;
pub mod user;
