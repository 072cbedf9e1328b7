//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Record persistence
//! - Adapters: Platform integrations (Slack, console)

pub mod config;
pub mod storage;
pub mod adapters;
