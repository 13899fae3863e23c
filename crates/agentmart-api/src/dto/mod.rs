//! Data Transfer Objects
//!
//! Request and response structures for the API. Field names are camelCase
//! on the wire.

pub mod agent;
pub mod common;
pub mod purchase;
pub mod transaction;
pub mod user;

pub use agent::*;
pub use common::*;
pub use purchase::*;
pub use transaction::*;
pub use user::*;
