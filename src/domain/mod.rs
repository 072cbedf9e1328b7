//! Domain layer - Core business logic
//! 
//! This layer contains:
//! - Entities: Core business objects (User, InboundMessage, Command, Roster)
//! - Traits: Abstractions for infrastructure (Bot, Notifier, Directory, Store)
//! - Rules: Roster rotation invariants

pub mod entities;
pub mod traits;
