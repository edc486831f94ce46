//! sea-orm entities for the Homeswap API database.

pub mod active_sessions;
pub mod badges;
pub mod exchange_requests;
pub mod otp_verifications;
pub mod outbox_events;
pub mod pending_users;
pub mod properties;
pub mod user_badges;
pub mod users;
