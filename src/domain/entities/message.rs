use chrono::{DateTime, Utc};
use std::fmt;

/// Where an inbound message was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageContext {
    DirectMessage,
    Mention,
    ChannelMessage,
}

impl MessageContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageContext::DirectMessage => "direct_message",
            MessageContext::Mention => "mention",
            MessageContext::ChannelMessage => "channel_message",
        }
    }
}

impl fmt::Display for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound chat message, as handed to the dispatcher
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    pub sender_id: String,
    pub channel_id: String,
    pub context: MessageContext,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(sender_id: impl Into<String>, context: MessageContext, text: impl Into<String>) -> Self {
        let sender_id = sender_id.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: sender_id.clone(),
            sender_id,
            context,
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    pub fn direct(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(sender_id, MessageContext::DirectMessage, text)
    }

    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }
}
