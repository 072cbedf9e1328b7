use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{CommandHandler, Invocation};
use crate::domain::traits::Notifier;

const INTRO: &str = "Any time I am mentioned, I'll pass it along to the current pope.\
\nI will also pass along any direct messages that I don't recognize as a command.\
\nBesides this `help` command, I know the following commands:";

/// `help` - usage of every other command
pub struct HelpCommand {
    notifier: Arc<dyn Notifier>,
    text: String,
}

impl HelpCommand {
    pub fn new(notifier: Arc<dyn Notifier>, commands: String) -> Self {
        Self {
            notifier,
            text: format!("{}{}", INTRO, commands),
        }
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn handle(&self, invocation: Invocation) -> Result<(), CommandError> {
        self.notifier.send_private(invocation.sender(), &self.text).await?;
        Ok(())
    }
}
