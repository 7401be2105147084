//! Chat gateway - the outbound side of the chat platform
//!
//! The core never talks to a messaging API directly. Whatever runs the bot
//! provides a [`ChatGateway`]; the service uses it to deliver roles in
//! private and the refresh driver uses it to re-edit tracked messages.

use thiserror::Error;

use crate::notify::{ChatId, MessageRef};

/// How the platform should interpret message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Plain,
    MarkdownV2,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendOptions {
    pub parse_mode: ParseMode,
    pub markup: Option<Markup>,
}

impl SendOptions {
    pub fn markdown() -> Self {
        Self {
            parse_mode: ParseMode::MarkdownV2,
            markup: None,
        }
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// An inline button carrying callback data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub callback: String,
}

impl Button {
    pub fn new(label: impl Into<String>, callback: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback: callback.into(),
        }
    }
}

/// Rows of inline buttons attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup {
    pub rows: Vec<Vec<Button>>,
}

impl Markup {
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Chat {0} is unreachable")]
    Unreachable(ChatId),

    #[error("Message {0:?} no longer exists")]
    MessageGone(MessageRef),

    #[error("Gateway error: {0}")]
    Other(String),
}

/// Outbound messaging capability
#[cfg_attr(test, mockall::automock)]
pub trait ChatGateway: Send + Sync {
    /// Deliver a text message to a user's private chat
    fn send_private(
        &self,
        chat_id: ChatId,
        text: &str,
        options: &SendOptions,
    ) -> Result<MessageRef, GatewayError>;

    /// Replace the text and buttons of a message sent earlier
    fn edit_message<'a>(
        &self,
        message: &MessageRef,
        text: &str,
        markup: Option<&'a Markup>,
    ) -> Result<(), GatewayError>;
}

/// Escape text for [`ParseMode::MarkdownV2`]
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
        '\\',
    ];
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
