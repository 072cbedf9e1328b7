//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Roster store and rotation engine
//! - Commands: Pope command handlers and the relay
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing and dispatching

pub mod commands;
pub mod errors;
pub mod services;
pub mod messaging;
