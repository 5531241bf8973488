//! # chantrack Common Library
//!
//! Shared code for the chantrack service:
//! - Error and result types
//! - Service configuration (environment + TOML bootstrap)
//! - Database initialization and the channel store
//! - HTTP request/response bodies shared with clients

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
