//! API endpoint handlers module
//!
//! Contains all HTTP endpoint handler implementations.

pub mod completion;
pub mod health;
