//! Repository implementations

mod agent;
mod ownership;
mod user;

pub use agent::AgentRepo;
pub use ownership::OwnershipRepo;
pub use user::UserRepo;
