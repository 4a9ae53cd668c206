//! # Providers API Library
//!
//! This library provides the core functionality for the Providers API service,
//! including handlers, models, and server configuration.

pub mod config;
pub mod csrf;
pub mod db;
pub mod error;
pub mod export;
pub mod flash;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
