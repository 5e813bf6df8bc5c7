//! Replies sent back through the originating channel
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Replies go through the `Replier` trait so the dispatcher never touches serenity directly
//! - 1.0.0: Message length limits and UTF-8 safe truncation

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Generic failure notice; never includes details of the underlying error
pub const FAILURE_NOTICE: &str =
    "❌ Sorry, something went wrong while running that command. Please try again later.";

/// A button attached under a reply; its custom id routes back through the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    pub custom_id: String,
    pub label: String,
}

/// A single outgoing reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Only visible to the invoking user where the surface supports it (interactions)
    pub ephemeral: bool,
    pub buttons: Vec<ReplyButton>,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: truncate_for_message(&content.into()),
            ephemeral: false,
            buttons: Vec::new(),
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            ephemeral: true,
            ..Self::public(content)
        }
    }

    pub fn with_button(mut self, custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.buttons.push(ReplyButton {
            custom_id: custom_id.into(),
            label: label.into(),
        });
        self
    }
}

/// One text input in a modal form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalField {
    pub custom_id: String,
    pub label: String,
    pub paragraph: bool,
    pub required: bool,
    pub max_length: u64,
}

/// A modal form opened in response to a button or menu interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalForm {
    pub custom_id: String,
    pub title: String,
    pub fields: Vec<ModalField>,
}

/// Sends replies back to wherever an invocation came from
///
/// Implemented by the Discord adapters (channel message, interaction response)
/// and by test doubles that record what was sent.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn send(&self, reply: Reply) -> Result<()>;

    /// Open a modal; only component interactions can do this
    async fn open_modal(&self, form: ModalForm) -> Result<()> {
        Err(anyhow!("cannot open modal `{}` from this surface", form.custom_id))
    }
}

/// Truncate text to fit the message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.len() <= MESSAGE_LIMIT {
        return text.to_string();
    }

    let mut end = MESSAGE_LIMIT - 3;
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Split text on line boundaries into pieces no longer than `max_size`
///
/// Lines longer than `max_size` are truncated rather than split; this is only
/// used for listings where every line is short.
pub fn chunk_lines(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let line = if line.len() > max_size {
            truncate_to(line, max_size)
        } else {
            line.to_string()
        };

        if !current.is_empty() && current.len() + 1 + line.len() > max_size {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn truncate_to(text: &str, max_size: usize) -> String {
    let mut end = max_size;
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    text[..end].to_string()
}
