use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::{InboundMessage, MessageContext};
use crate::application::errors::{CommandError, ConfigError};

/// A matched command, ready to hand to its handler
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub message: InboundMessage,
    pub params: Vec<String>,
}

impl Invocation {
    pub fn sender(&self) -> &str {
        &self.message.sender_id
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

/// Command handler - the logic behind a registered keyword
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError>;
}

/// Parameters a command expects after its keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Params {
    None,
    /// One required user reference; a leading `@` is stripped
    Subject,
}

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub contexts: Vec<MessageContext>,
    pub params: Params,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new<H>(name: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            usage: None,
            contexts: vec![MessageContext::DirectMessage],
            params: Params::None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<MessageContext>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn matches(&self, keyword: &str) -> bool {
        self.name.eq_ignore_ascii_case(keyword)
    }

    pub fn accepts(&self, context: MessageContext) -> bool {
        self.contexts.contains(&context)
    }
}

/// Command registry, keyed by lowercased keyword
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<(), ConfigError> {
        let key = command.name.to_lowercase();
        if self.commands.contains_key(&key) {
            return Err(ConfigError::DuplicateCommand(command.name));
        }
        self.order.push(key.clone());
        self.commands.insert(key, command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(&name.to_lowercase())
    }

    /// Command for `keyword` that applies in `context`
    pub fn find(&self, keyword: &str, context: MessageContext) -> Option<&Command> {
        self.get(keyword).filter(|c| c.accepts(context))
    }

    /// Commands in registration order
    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.order.iter().filter_map(|k| self.commands.get(k))
    }

    pub fn help_text(&self) -> String {
        let mut help = String::new();
        for cmd in self.all() {
            let usage = cmd.usage.as_deref().unwrap_or(&cmd.name);
            help.push_str(&format!(
                "\n`{}` {}",
                usage,
                cmd.description.as_deref().unwrap_or("")
            ));
        }
        help
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
