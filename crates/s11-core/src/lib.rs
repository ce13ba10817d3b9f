//! # s11-core
//!
//! Core crate for the S11 travel map. Contains the configuration schemas
//! and the unified error system shared by the plugin loader, the map
//! context and the built-in plugins.
//!
//! This crate has **no** internal dependencies on other S11 crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
