pub mod config;
pub mod cosmos;
pub mod credential;
