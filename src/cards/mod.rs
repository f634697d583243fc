//! Flex Message construction for activity replies.

pub mod flex;

pub use flex::{
    FlexMessage, MAX_CAROUSEL_BUBBLES, NO_ACTIVITIES_TEXT, activity_card, activity_carousel,
    intro_card,
};

/// A normalized bot reply: either a structured Flex Message or plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum BotReply {
    Flex(FlexMessage),
    Text(String),
}

impl BotReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}
