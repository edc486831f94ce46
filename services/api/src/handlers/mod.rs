pub mod account;
pub mod auth;
pub mod exchange;
pub mod users;
pub mod validate;
