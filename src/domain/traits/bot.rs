use async_trait::async_trait;
use crate::domain::entities::User;
use crate::application::errors::BotError;

/// Outbound messages to the chat platform
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a private (direct) message to a user
    async fn send_private(&self, user_id: &str, text: &str) -> Result<(), BotError>;

    /// Post to the configured announcement channel
    async fn send_channel(&self, text: &str) -> Result<(), BotError>;
}

/// Identity and channel lookups on the chat platform
#[async_trait]
pub trait Directory: Send + Sync {
    async fn resolve_user_by_name(&self, name: &str) -> Result<Option<User>, BotError>;

    async fn resolve_user_by_id(&self, id: &str) -> Result<User, BotError>;

    /// Short description of where a message came from, e.g. "In channel `general`"
    async fn describe_channel(&self, channel_id: &str) -> Result<String, BotError>;
}

/// Bot trait - a platform adapter with a lifecycle
#[async_trait]
pub trait Bot: Notifier + Directory {
    /// Connect to the platform. Failing here is fatal at startup.
    async fn start(&self) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
}
