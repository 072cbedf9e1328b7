//! Pope queue commands and the relay fallback

pub mod help;
pub mod quotes;
pub mod relay;
pub mod roster;

use std::sync::Arc;

use crate::application::errors::ConfigError;
use crate::application::messaging::CommandDispatcher;
use crate::application::services::RosterService;
use crate::domain::entities::{Command, CommandRegistry, MessageContext, Params};
use crate::domain::traits::{Directory, Notifier};

pub use help::HelpCommand;
pub use relay::RelayHandler;
pub use roster::{AddPope, CyclePope, DeferPope, ListPopes, RemovePope};

/// Services shared by every pope command
#[derive(Clone)]
pub struct PopeServices {
    pub roster: Arc<RosterService>,
    pub notifier: Arc<dyn Notifier>,
    pub directory: Arc<dyn Directory>,
    /// Post rotations to the announcement channel
    pub announce: bool,
}

impl PopeServices {
    /// Display name for `id`, or the id itself when the lookup fails
    pub async fn name_of(&self, id: &str) -> String {
        match self.directory.resolve_user_by_id(id).await {
            Ok(user) => user.display_name(),
            Err(e) => {
                tracing::debug!("Could not resolve user {}: {}", id, e);
                id.to_string()
            }
        }
    }

    /// Best-effort private message; the command already succeeded
    pub async fn notify(&self, user_id: &str, text: &str) {
        if let Err(e) = self.notifier.send_private(user_id, text).await {
            tracing::warn!("Could not notify {}: {}", user_id, e);
        }
    }

    pub async fn announce(&self, text: &str) {
        if !self.announce {
            return;
        }
        if let Err(e) = self.notifier.send_channel(text).await {
            tracing::warn!("Could not post announcement: {}", e);
        }
    }
}

/// Fill `registry` with the pope commands, `help` last so it can describe the rest.
pub fn register_pope_commands(
    registry: &mut CommandRegistry,
    services: &PopeServices,
) -> Result<(), ConfigError> {
    registry.register(
        Command::new("list", ListPopes::new(services.clone()))
            .with_description("lists the current queue of popes."),
    )?;
    registry.register(
        Command::new("cyclePope", CyclePope::new(services.clone()))
            .with_description("puts the current pope at the end of the queue."),
    )?;
    registry.register(
        Command::new("deferPope", DeferPope::new(services.clone())).with_description(
            "swaps the current and next popes. Use this when the scheduled pope is unavailable for the week.",
        ),
    )?;
    registry.register(
        Command::new("addPope", AddPope::new(services.clone()))
            .with_params(Params::Subject)
            .with_usage("addPope user-name")
            .with_description("adds a user to the end of the pope queue."),
    )?;
    registry.register(
        Command::new("removePope", RemovePope::new(services.clone()))
            .with_params(Params::Subject)
            .with_usage("removePope user-name")
            .with_description(
                "removes a user from the pope queue. *NOTE:* If the current pope is removed, \
                 the next user becomes pope but _is not automatically notified._",
            ),
    )?;

    let help = HelpCommand::new(services.notifier.clone(), registry.help_text());
    registry.register(Command::new("help", help).with_description("shows this message."))?;
    Ok(())
}

/// Contexts in which unmatched messages are relayed to the current pope
pub fn relay_contexts() -> Vec<MessageContext> {
    vec![MessageContext::DirectMessage, MessageContext::Mention]
}

/// Dispatcher with every pope command registered and the relay as fallback
pub fn build_dispatcher(services: PopeServices) -> Result<CommandDispatcher, ConfigError> {
    let mut registry = CommandRegistry::new();
    register_pope_commands(&mut registry, &services)?;
    tracing::debug!("Registered {} commands", registry.len());

    let notifier = services.notifier.clone();
    Ok(CommandDispatcher::new(registry, notifier)
        .with_fallback(RelayHandler::new(services), relay_contexts()))
}
