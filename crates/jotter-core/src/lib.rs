//! # jotter-core
//!
//! Core types, traits, and abstractions for the jotter note service.
//!
//! This crate provides the data models, the store traits the services are
//! written against, and the shared error type. It performs no I/O.

pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use uuid_utils::{new_v7, parse_id};
