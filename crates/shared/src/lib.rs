//! Shared types, errors, and configuration for Boekstroom.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - External identifier newtypes for the bookkeeping API
//! - Amount rounding helpers with decimal precision
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
