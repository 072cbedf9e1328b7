//! Console adapter for development/testing
//!
//! Lines typed on stdin are inbound messages from the configured console user.
//! `@bot <text>` is a mention, `as <name>: <text>` speaks as another configured user.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, MessageContext, User};
use crate::domain::traits::{Bot, BotInfo, Directory, Notifier};
use crate::infrastructure::config::ConsoleConfig;

const DM_CHANNEL: &str = "D0CONSOLE";
const PUBLIC_CHANNEL: &str = "C0CONSOLE";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    user_id: String,
    users: HashMap<String, User>,
    announce_channel: Option<String>,
    lines: Mutex<Option<Lines<BufReader<Stdin>>>>,
}

impl ConsoleAdapter {
    pub fn new(config: &ConsoleConfig, bot_name: &str) -> Self {
        let mut users: HashMap<String, User> = config
            .users
            .iter()
            .map(|u| (u.id.clone(), User::new(u.id.clone()).with_name(u.name.clone())))
            .collect();
        users
            .entry(config.user_id.clone())
            .or_insert_with(|| User::new(config.user_id.clone()).with_name("console"));

        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: bot_name.to_string(),
            },
            user_id: config.user_id.clone(),
            users,
            announce_channel: None,
            lines: Mutex::new(None),
        }
    }

    pub fn with_announce_channel(mut self, channel: Option<String>) -> Self {
        self.announce_channel = channel;
        self
    }

    /// Turn a typed line into an inbound message
    pub fn parse_line(&self, line: &str) -> Option<InboundMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (sender, text) = match line.strip_prefix("as ").and_then(|rest| rest.split_once(':')) {
            Some((name, text)) => match self.find_by_name(name.trim()) {
                Some(user) => (user.id.clone(), text.trim()),
                None => {
                    println!("[BOT] Unknown console user '{}'", name.trim());
                    return None;
                }
            },
            None => (self.user_id.clone(), line),
        };

        let mention = text
            .strip_prefix("@bot")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));
        let message = match mention {
            Some(rest) => InboundMessage::new(sender, MessageContext::Mention, rest.trim())
                .with_channel(PUBLIC_CHANNEL),
            None => InboundMessage::direct(sender, text).with_channel(DM_CHANNEL),
        };
        Some(message)
    }

    /// Next message from stdin; `None` once stdin is closed
    pub async fn next_message(&self) -> Option<InboundMessage> {
        let mut lines = self.lines.lock().await;
        let lines = lines.get_or_insert_with(|| BufReader::new(tokio::io::stdin()).lines());
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(message) = self.parse_line(&line) {
                        return Some(message);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!("Failed to read from stdin: {}", e);
                    return None;
                }
            }
        }
    }

    fn find_by_name(&self, name: &str) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }
}

#[async_trait]
impl Notifier for ConsoleAdapter {
    async fn send_private(&self, user_id: &str, text: &str) -> Result<(), BotError> {
        let to = self
            .users
            .get(user_id)
            .map(User::display_name)
            .unwrap_or_else(|| user_id.to_string());
        println!("[BOT -> {}] {}", to, text);
        Ok(())
    }

    async fn send_channel(&self, text: &str) -> Result<(), BotError> {
        let channel = self
            .announce_channel
            .as_deref()
            .ok_or_else(|| BotError::Config("no announcement channel configured".to_string()))?;
        println!("[BOT #{}] {}", channel, text);
        Ok(())
    }
}

#[async_trait]
impl Directory for ConsoleAdapter {
    async fn resolve_user_by_name(&self, name: &str) -> Result<Option<User>, BotError> {
        Ok(self.find_by_name(name).cloned())
    }

    async fn resolve_user_by_id(&self, id: &str) -> Result<User, BotError> {
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| BotError::NotFound(format!("user {}", id)))
    }

    async fn describe_channel(&self, channel_id: &str) -> Result<String, BotError> {
        Ok(match channel_id {
            DM_CHANNEL => "Private messaged me".to_string(),
            PUBLIC_CHANNEL => "In channel `console`".to_string(),
            _ => "Unknown source".to_string(),
        })
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode) as user {}", self.user_id);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
