pub mod command;
pub mod config;
pub mod host;
pub mod types;
