//! # Domain Module
//!
//! Core domain types for the Coordinator.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
