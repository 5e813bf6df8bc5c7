//! `Replier` implementations backed by the Discord HTTP API

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serenity::builder::CreateComponents;
use serenity::http::Http;
use serenity::model::application::component::{ButtonStyle, InputTextStyle};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::ChannelId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::{ModalForm, Replier, Reply, ReplyButton};

/// Discord allows at most five buttons per action row
const BUTTONS_PER_ROW: usize = 5;

/// Lay buttons out in action rows
fn button_rows<'a>(
    components: &'a mut CreateComponents,
    buttons: &[ReplyButton],
) -> &'a mut CreateComponents {
    for row_buttons in buttons.chunks(BUTTONS_PER_ROW) {
        components.create_action_row(|row| {
            for button in row_buttons {
                row.create_button(|b| {
                    b.custom_id(&button.custom_id)
                        .label(&button.label)
                        .style(ButtonStyle::Primary)
                });
            }
            row
        });
    }
    components
}

fn modal_rows<'a>(components: &'a mut CreateComponents, form: &ModalForm) -> &'a mut CreateComponents {
    for field in &form.fields {
        components.create_action_row(|row| {
            row.create_input_text(|input| {
                input
                    .custom_id(&field.custom_id)
                    .label(&field.label)
                    .style(if field.paragraph {
                        InputTextStyle::Paragraph
                    } else {
                        InputTextStyle::Short
                    })
                    .required(field.required)
                    .max_length(field.max_length)
            })
        });
    }
    components
}

/// Replies to a text command by posting in the same channel
pub struct ChannelReplier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelReplier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl Replier for ChannelReplier {
    async fn send(&self, reply: Reply) -> Result<()> {
        // Ephemeral has no meaning for plain channel messages
        self.channel_id
            .send_message(&self.http, |m| {
                m.content(&reply.content);
                if !reply.buttons.is_empty() {
                    m.components(|c| button_rows(c, &reply.buttons));
                }
                m
            })
            .await?;
        Ok(())
    }
}

/// The interaction an `InteractionReplier` answers
pub enum InteractionSource {
    Command(ApplicationCommandInteraction),
    Component(MessageComponentInteraction),
    Modal(ModalSubmitInteraction),
}

macro_rules! with_interaction {
    ($source:expr, $interaction:ident => $body:expr) => {
        match $source {
            InteractionSource::Command($interaction) => $body,
            InteractionSource::Component($interaction) => $body,
            InteractionSource::Modal($interaction) => $body,
        }
    };
}

/// Replies to an interaction
///
/// The first reply is the interaction response; every later one is sent as a
/// followup message, since an interaction may only be responded to once.
pub struct InteractionReplier {
    http: Arc<Http>,
    source: InteractionSource,
    responded: AtomicBool,
}

impl InteractionReplier {
    pub fn new(http: Arc<Http>, source: InteractionSource) -> Self {
        Self {
            http,
            source,
            responded: AtomicBool::new(false),
        }
    }

    fn claim_response(&self) -> bool {
        !self.responded.swap(true, Ordering::SeqCst)
    }
}

#[async_trait]
impl Replier for InteractionReplier {
    async fn send(&self, reply: Reply) -> Result<()> {
        if self.claim_response() {
            with_interaction!(&self.source, interaction => {
                interaction
                    .create_interaction_response(&self.http, |r| {
                        r.kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|d| {
                                d.content(&reply.content).ephemeral(reply.ephemeral);
                                if !reply.buttons.is_empty() {
                                    d.components(|c| button_rows(c, &reply.buttons));
                                }
                                d
                            })
                    })
                    .await?;
            });
        } else {
            with_interaction!(&self.source, interaction => {
                interaction
                    .create_followup_message(&self.http, |f| {
                        f.content(&reply.content).ephemeral(reply.ephemeral);
                        if !reply.buttons.is_empty() {
                            f.components(|c| button_rows(c, &reply.buttons));
                        }
                        f
                    })
                    .await?;
            });
        }
        Ok(())
    }

    async fn open_modal(&self, form: ModalForm) -> Result<()> {
        if !self.claim_response() {
            return Err(anyhow!(
                "interaction already answered; cannot open modal `{}`",
                form.custom_id
            ));
        }

        match &self.source {
            InteractionSource::Command(command) => {
                command
                    .create_interaction_response(&self.http, |r| {
                        r.kind(InteractionResponseType::Modal)
                            .interaction_response_data(|d| {
                                d.custom_id(&form.custom_id)
                                    .title(&form.title)
                                    .components(|c| modal_rows(c, &form))
                            })
                    })
                    .await?;
            }
            InteractionSource::Component(component) => {
                component
                    .create_interaction_response(&self.http, |r| {
                        r.kind(InteractionResponseType::Modal)
                            .interaction_response_data(|d| {
                                d.custom_id(&form.custom_id)
                                    .title(&form.title)
                                    .components(|c| modal_rows(c, &form))
                            })
                    })
                    .await?;
            }
            InteractionSource::Modal(_) => {
                return Err(anyhow!("a modal submission cannot open another modal"));
            }
        }
        Ok(())
    }
}
