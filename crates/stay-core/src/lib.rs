//! # stay-core
//!
//! Core types, errors, and configuration for Staybook.
//!
//! This crate provides the building blocks shared by every other crate:
//! - Validation error collections
//! - The list query and paginated envelope types
//! - Identifier and calendar parsing helpers
//! - Application configuration

pub mod config;
pub mod error;
pub mod pagination;
pub mod types;

pub use error::*;
pub use pagination::*;
pub use types::*;
