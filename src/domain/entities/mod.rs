//! Domain entities - Core business objects

pub mod user;
pub mod message;
pub mod command;
pub mod roster;

pub use user::User;
pub use message::{InboundMessage, MessageContext};
pub use command::{Command, CommandHandler, CommandRegistry, Invocation, Params};
pub use roster::{Roster, RosterListing, Rotation};
