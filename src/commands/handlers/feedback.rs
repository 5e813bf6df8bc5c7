//! Feedback button and modal
//!
//! The help message carries a "Send Feedback" button; pressing it opens a
//! modal whose submission is routed back here by custom id.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use super::utility::FEEDBACK_OPEN_ID;
use crate::commands::context::{CommandContext, InvocationContext};
use crate::commands::descriptor::HandlerDescriptor;
use crate::commands::handler::Handler;
use crate::core::{ModalField, ModalForm, Replier, Reply};

pub const FEEDBACK_MODAL_ID: &str = "feedback_modal";
pub const TOPIC_FIELD: &str = "topic";
pub const MESSAGE_FIELD: &str = "message";

pub fn feedback_form() -> ModalForm {
    ModalForm {
        custom_id: FEEDBACK_MODAL_ID.to_string(),
        title: "Send Feedback".to_string(),
        fields: vec![
            ModalField {
                custom_id: TOPIC_FIELD.to_string(),
                label: "Topic".to_string(),
                paragraph: false,
                required: false,
                max_length: 100,
            },
            ModalField {
                custom_id: MESSAGE_FIELD.to_string(),
                label: "Your feedback".to_string(),
                paragraph: true,
                required: true,
                max_length: 1000,
            },
        ],
    }
}

/// Button that opens the feedback modal
pub struct FeedbackButtonHandler;

#[async_trait]
impl Handler for FeedbackButtonHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::button(FEEDBACK_OPEN_ID).description("Open the feedback form")
    }

    async fn execute(
        &self,
        _ctx: Arc<CommandContext>,
        _invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        replier.open_modal(feedback_form()).await
    }
}

/// Receives feedback modal submissions
pub struct FeedbackModalHandler;

#[async_trait]
impl Handler for FeedbackModalHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::modal(FEEDBACK_MODAL_ID).cooldown(30)
    }

    async fn execute(
        &self,
        _ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        let message = invocation.field(MESSAGE_FIELD).unwrap_or_default().trim();
        if message.is_empty() {
            return replier
                .send(Reply::ephemeral("❌ Feedback can't be empty"))
                .await;
        }
        let topic = invocation
            .field(TOPIC_FIELD)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("general");

        info!(
            "Feedback [{}] from user {} in guild {:?}: {}",
            topic, invocation.actor_id, invocation.guild_id, message
        );

        replier
            .send(Reply::ephemeral("🙏 Thanks for the feedback!"))
            .await
    }
}
