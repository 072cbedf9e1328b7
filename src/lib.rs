//! pope-bot - keeps a rotating on-call queue ("pope queue") and relays
//! messages to whoever currently holds the role.

pub mod application;
pub mod domain;
pub mod infrastructure;
