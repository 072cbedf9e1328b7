use async_trait::async_trait;

use super::PopeServices;
use crate::application::errors::CommandError;
use crate::domain::entities::{CommandHandler, Invocation};

/// Forwards unmatched direct messages and mentions to the current pope
pub struct RelayHandler {
    services: PopeServices,
}

impl RelayHandler {
    pub fn new(services: PopeServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for RelayHandler {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError> {
        let message = &invocation.message;
        let current = self.services.roster.current().await?;
        let sender = self.services.name_of(&message.sender_id).await;
        let channel = match self.services.directory.describe_channel(&message.channel_id).await {
            Ok(description) => description,
            Err(e) => {
                tracing::debug!("Could not describe channel {}: {}", message.channel_id, e);
                "Unknown source".to_string()
            }
        };

        tracing::info!("{}, @pope via {}: {}", sender, channel, message.text);
        self.services
            .notifier
            .send_private(&current, &format!("{} ({}): {}", sender, channel, message.text))
            .await?;
        Ok(())
    }
}
