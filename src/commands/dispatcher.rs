//! Event dispatcher
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! One incoming event becomes at most one handler execution:
//! parse → resolve → gate → cooldown → execute. Nothing a handler does,
//! including panicking, escapes `dispatch`.

use futures::FutureExt;
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError};
use uuid::Uuid;

use super::context::{CommandContext, IncomingEvent, InvocationContext, Payload, Source};
use super::descriptor::{HandlerDescriptor, HandlerKind};
use super::parser::{parse_custom_id, parse_text, ParsedInput};
use super::registry::RegisteredHandler;
use crate::core::config::OwnerCooldownBypass;
use crate::core::{Denial, Replier, Reply, FAILURE_NOTICE};
use crate::features::cooldowns::{CooldownStatus, CooldownTracker};
use crate::features::permissions::PermissionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    BotActor,
    MissingPrefix,
    EmptyToken,
    UnknownToken,
    /// The token names a handler bound to a different surface
    KindMismatch,
}

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    Denied { handler_id: String, denial: Denial },
    Executed { handler_id: String },
    Failed { handler_id: String },
}

pub struct Dispatcher {
    context: Arc<CommandContext>,
    gate: PermissionGate,
    cooldowns: CooldownTracker,
    owner_bypass: OwnerCooldownBypass,
}

impl Dispatcher {
    pub fn new(context: Arc<CommandContext>, gate: PermissionGate, cooldowns: CooldownTracker) -> Self {
        Self {
            context,
            gate,
            cooldowns,
            owner_bypass: OwnerCooldownBypass::default(),
        }
    }

    pub fn with_owner_bypass(mut self, owner_bypass: OwnerCooldownBypass) -> Self {
        self.owner_bypass = owner_bypass;
        self
    }

    pub fn context(&self) -> &Arc<CommandContext> {
        &self.context
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Run one event through the pipeline
    ///
    /// Denials and failures are reported through `replier`; unknown tokens
    /// and non-commands are dropped silently.
    pub async fn dispatch(&self, event: IncomingEvent, replier: &dyn Replier) -> Outcome {
        if event.actor.is_bot {
            return Outcome::Ignored(IgnoreReason::BotActor);
        }

        let (parsed, surface, payload) = match self.parse(&event) {
            Ok(parsed) => parsed,
            Err(reason) => return Outcome::Ignored(reason),
        };

        let Some(entry) = self.resolve(&parsed.token) else {
            debug!("Ignoring unknown token '{}'", parsed.token);
            return Outcome::Ignored(IgnoreReason::UnknownToken);
        };
        let descriptor = Arc::clone(&entry.descriptor);
        if descriptor.kind != surface {
            debug!(
                "Ignoring '{}': handler is a {:?}, event is a {:?}",
                parsed.token, descriptor.kind, surface
            );
            return Outcome::Ignored(IgnoreReason::KindMismatch);
        }

        let request_id = Uuid::new_v4();
        let actor_id = event.actor.id;

        if let Err(denial) = self.admit(&event, &descriptor) {
            info!(
                "[{request_id}] Denied '{}' for user {actor_id}: {denial}",
                descriptor.id
            );
            self.notify(replier, Reply::ephemeral(denial.notice())).await;
            return Outcome::Denied {
                handler_id: descriptor.id.clone(),
                denial,
            };
        }

        let invocation = InvocationContext {
            request_id,
            handler_id: descriptor.id.clone(),
            actor_id,
            guild_id: event.guild_id,
            channel_id: event.channel_id,
            raw_args: parsed.args,
            locale: event.locale,
            payload,
        };
        self.execute(entry, invocation, replier).await
    }

    fn parse(&self, event: &IncomingEvent) -> Result<(ParsedInput, HandlerKind, Payload), IgnoreReason> {
        match &event.source {
            Source::Text(content) => {
                let prefix = self.context.guild_settings.prefix(event.guild_id);
                match parse_text(content, &prefix) {
                    Some(parsed) => Ok((parsed, HandlerKind::Command, Payload::None)),
                    None if content.trim_start().starts_with(prefix.as_str()) => {
                        Err(IgnoreReason::EmptyToken)
                    }
                    None => Err(IgnoreReason::MissingPrefix),
                }
            }
            Source::Interaction {
                kind,
                custom_id,
                args,
                payload,
            } => {
                let mut parsed = parse_custom_id(custom_id).ok_or(IgnoreReason::EmptyToken)?;
                parsed.args.extend(args.iter().cloned());
                Ok((parsed, *kind, payload.clone()))
            }
        }
    }

    fn resolve(&self, token: &str) -> Option<RegisteredHandler> {
        self.context
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(token)
    }

    /// Gate then cooldown; completes without awaiting so the cooldown
    /// read-check-write for a key cannot interleave with other work
    fn admit(&self, event: &IncomingEvent, descriptor: &HandlerDescriptor) -> Result<(), Denial> {
        self.gate
            .evaluate(&event.actor, event.bot_permissions, descriptor)?;

        if self.skips_cooldown(event.actor.id, descriptor) {
            return Ok(());
        }

        match self
            .cooldowns
            .check(&descriptor.id, event.actor.id, descriptor.cooldown_seconds)
        {
            CooldownStatus::Allowed => Ok(()),
            CooldownStatus::Denied { remaining_ms } => Err(Denial::CooldownActive { remaining_ms }),
        }
    }

    fn skips_cooldown(&self, actor_id: u64, descriptor: &HandlerDescriptor) -> bool {
        if !self.gate.is_owner(actor_id) {
            return false;
        }
        match self.owner_bypass {
            OwnerCooldownBypass::Never => false,
            OwnerCooldownBypass::OwnerOnlyHandlers => descriptor.owner_only,
            OwnerCooldownBypass::Always => true,
        }
    }

    async fn execute(
        &self,
        entry: RegisteredHandler,
        invocation: InvocationContext,
        replier: &dyn Replier,
    ) -> Outcome {
        let handler_id = invocation.handler_id.clone();
        let request_id = invocation.request_id;
        debug!(
            "[{request_id}] Executing '{handler_id}' for user {} with {} args",
            invocation.actor_id,
            invocation.raw_args.len()
        );

        let result = AssertUnwindSafe(entry.handler.execute(
            Arc::clone(&self.context),
            &invocation,
            replier,
        ))
        .catch_unwind()
        .await;

        match result {
            Ok(Ok(())) => Outcome::Executed { handler_id },
            Ok(Err(e)) => {
                error!(
                    "[{request_id}] Handler '{handler_id}' failed for user {}: {e:?}",
                    invocation.actor_id
                );
                self.notify(replier, Reply::ephemeral(FAILURE_NOTICE)).await;
                Outcome::Failed { handler_id }
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    "[{request_id}] Handler '{handler_id}' panicked for user {}: {message}",
                    invocation.actor_id
                );
                self.notify(replier, Reply::ephemeral(FAILURE_NOTICE)).await;
                Outcome::Failed { handler_id }
            }
        }
    }

    async fn notify(&self, replier: &dyn Replier, reply: Reply) {
        if let Err(e) = replier.send(reply).await {
            warn!("Failed to deliver notice: {e}");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
