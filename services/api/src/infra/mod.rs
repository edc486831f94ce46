pub mod db;
pub mod scheduler;
