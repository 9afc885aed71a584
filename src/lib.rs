pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod scheduler;
pub mod services;
pub mod tracker;
