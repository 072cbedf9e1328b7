//! Message handling - Event-driven message processing

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use parser::{MessageParser, ParsedCommand};
