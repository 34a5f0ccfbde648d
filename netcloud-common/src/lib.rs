//! # NetCloud Common Library
//!
//! Shared code for the NetCloud catalog bot including:
//! - Configuration loading (TOML, environment credentials)
//! - Error types
//! - Title normalization used as the matching key
//! - The genre → topic table

pub mod config;
pub mod error;
pub mod genre;
pub mod title;

pub use error::{Error, Result};
pub use genre::{Genre, TopicMap};
pub use title::normalize;
