pub mod account;
pub mod authenticate;
pub mod badge;
pub mod exchange;
pub mod password;
pub mod registration;
pub mod session;
pub mod sweeper;
pub mod token;
