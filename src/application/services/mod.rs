//! Application services - Business logic orchestration

pub mod roster_store;
pub mod roster_service;

pub use roster_store::RosterStore;
pub use roster_service::RosterService;
