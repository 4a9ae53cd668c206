//! Database seeding functionality
//!
//! This module provides functionality to seed the database with initial data
//! when the application starts with seeding enabled.

pub mod provider;

pub use provider::seed_providers;
