pub mod registration;
pub mod repository;
pub mod types;
