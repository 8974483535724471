//! Coinpress Core Library
//!
//! Core types, configuration, and error handling for the Coinpress portal generator.

pub mod config;
pub mod entry;
pub mod error;

pub use config::Config;
pub use entry::{Entry, SiteIndex};
pub use error::{CoreError, Result};
