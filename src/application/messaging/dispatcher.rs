//! Message dispatcher - Routes messages to command handlers

use std::sync::Arc;
use tracing::Instrument;

use super::parser::MessageParser;
use crate::application::errors::CommandError;
use crate::domain::entities::{
    CommandHandler, CommandRegistry, InboundMessage, Invocation, MessageContext, Params,
};
use crate::domain::traits::Notifier;

/// Keyword under which fallback invocations are logged
pub const RELAY_COMMAND: &str = "relay";

/// What happened to a dispatched message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion
    Completed { command: String },
    /// The handler failed; `message` was sent to the sender
    Failed { command: String, message: String },
    /// No command and no fallback applied
    Ignored,
}

/// Handler for messages that match no command
struct Fallback {
    handler: Arc<dyn CommandHandler>,
    contexts: Vec<MessageContext>,
}

/// Message dispatcher - matches messages against the command table
///
/// The registry is frozen once the dispatcher is built.
pub struct CommandDispatcher {
    parser: MessageParser,
    registry: CommandRegistry,
    fallback: Option<Fallback>,
    notifier: Arc<dyn Notifier>,
}

impl CommandDispatcher {
    pub fn new(registry: CommandRegistry, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            parser: MessageParser::new(),
            registry,
            fallback: None,
            notifier,
        }
    }

    /// Route unmatched messages received in `contexts` to `handler`
    pub fn with_fallback<H>(mut self, handler: H, contexts: Vec<MessageContext>) -> Self
    where
        H: CommandHandler + 'static,
    {
        self.fallback = Some(Fallback {
            handler: Arc::new(handler),
            contexts,
        });
        self
    }

    /// Process one inbound message. Never fails: handler errors are reported
    /// to the sender and logged.
    pub async fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        let span = tracing::info_span!(
            "dispatch",
            message_id = %message.id,
            sender = %message.sender_id,
            context = %message.context,
        );
        self.route(message).instrument(span).await
    }

    async fn route(&self, message: InboundMessage) -> DispatchOutcome {
        let Some(parsed) = self.parser.parse(&message.text) else {
            return DispatchOutcome::Ignored;
        };

        if let Some(cmd) = self.registry.find(&parsed.keyword, message.context) {
            let params = parsed.params_for(cmd.params);
            let command = cmd.name.clone();
            tracing::info!(command = %command, "Received request from {}: {}", message.sender_id, message.text);

            if cmd.params == Params::Subject && params.is_empty() {
                tracing::debug!(command = %command, "Request had no parameter");
                let err = CommandError::Validation("You must provide a user name!".to_string());
                return self.report(command, &message.sender_id, err).await;
            }

            let invocation = Invocation {
                command,
                message,
                params,
            };
            return self.run(cmd.handler.clone(), invocation).await;
        }

        match &self.fallback {
            Some(fallback) if fallback.contexts.contains(&message.context) => {
                tracing::debug!("Unmatched message from {}, relaying", message.sender_id);
                let invocation = Invocation {
                    command: RELAY_COMMAND.to_string(),
                    message,
                    params: Vec::new(),
                };
                self.run(fallback.handler.clone(), invocation).await
            }
            _ => DispatchOutcome::Ignored,
        }
    }

    /// Run the handler on its own task so a panic stays contained
    async fn run(&self, handler: Arc<dyn CommandHandler>, invocation: Invocation) -> DispatchOutcome {
        let command = invocation.command.clone();
        let sender = invocation.message.sender_id.clone();

        let result = match tokio::spawn(async move { handler.handle(invocation).await }).await {
            Ok(result) => result,
            Err(join_err) => Err(CommandError::Internal(join_err.to_string())),
        };

        match result {
            Ok(()) => DispatchOutcome::Completed { command },
            Err(err) => self.report(command, &sender, err).await,
        }
    }

    async fn report(&self, command: String, sender: &str, err: CommandError) -> DispatchOutcome {
        let message = err.user_message();
        tracing::debug!(command = %command, error = ?err, "Raw failure");
        if err.is_fault() {
            tracing::error!(command = %command, "Failed: {}", err);
        } else {
            tracing::warn!(command = %command, "Failed for reason: {}", message);
        }

        if let Err(e) = self.notifier.send_private(sender, &message).await {
            tracing::error!(command = %command, "Could not report failure to {}: {}", sender, e);
        }

        DispatchOutcome::Failed { command, message }
    }
}
