//! Core module - errors, configuration and logging shared by every calculator

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigError};
pub use error::{DomainError, LookupMiss};
