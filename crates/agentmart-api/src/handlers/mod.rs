//! API Handlers
//!
//! Request handlers for all API endpoints, one module per resource.

pub mod agent;
pub mod health;
pub mod purchase;
pub mod transaction;
pub mod user;

pub use health::*;
