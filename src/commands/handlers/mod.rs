//! Built-in handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.0.0: Handlers describe themselves; the registry is built from `create_all_handlers`
//! - 2.0.0: Add feedback button and modal handlers
//! - 1.0.0: Initial extraction of utility, prefix and security handlers

pub mod feedback;
pub mod prefix;
pub mod security;
pub mod utility;

use std::sync::Arc;

use super::handler::Handler;
use super::registry::CommandRegistry;
use crate::core::RegistryError;

pub use feedback::{FeedbackButtonHandler, FeedbackModalHandler};
pub use prefix::PrefixHandler;
pub use security::{BlockIpHandler, BlockListHandler, UnblockIpHandler};
pub use utility::{HelpHandler, HelpRefreshHandler, PingHandler, UptimeHandler};

/// Create all built-in handlers
pub fn create_all_handlers() -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(PingHandler),
        Arc::new(HelpHandler),
        Arc::new(UptimeHandler),
        Arc::new(PrefixHandler),
        Arc::new(BlockIpHandler),
        Arc::new(UnblockIpHandler),
        Arc::new(BlockListHandler),
        Arc::new(HelpRefreshHandler),
        Arc::new(FeedbackButtonHandler),
        Arc::new(FeedbackModalHandler),
    ]
}

/// Register every built-in handler; fails on the first name collision
pub fn build_registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    for handler in create_all_handlers() {
        registry.register(handler)?;
    }
    Ok(registry)
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    use crate::commands::context::{CommandContext, InvocationContext, Payload};
    use crate::commands::handler::Handler;
    use crate::commands::registry::CommandRegistry;
    use crate::core::{ModalForm, Replier, Reply};
    use crate::features::guild_settings::GuildSettings;
    use crate::features::rate_limiting::{SecurityGuard, SecurityPolicy};

    #[derive(Default)]
    pub struct RecordingReplier {
        sent: Mutex<Vec<Reply>>,
        modals: Mutex<Vec<ModalForm>>,
    }

    impl RecordingReplier {
        pub fn sent(&self) -> Vec<Reply> {
            self.sent.lock().unwrap().clone()
        }

        pub fn modals(&self) -> Vec<ModalForm> {
            self.modals.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Replier for RecordingReplier {
        async fn send(&self, reply: Reply) -> Result<()> {
            self.sent.lock().unwrap().push(reply);
            Ok(())
        }

        async fn open_modal(&self, form: ModalForm) -> Result<()> {
            self.modals.lock().unwrap().push(form);
            Ok(())
        }
    }

    pub fn context_with(handlers: Vec<Arc<dyn Handler>>) -> Arc<CommandContext> {
        let mut registry = CommandRegistry::new();
        for handler in handlers {
            registry.register(handler).unwrap();
        }
        Arc::new(CommandContext::new(
            registry.into_shared(),
            GuildSettings::new("!"),
            Arc::new(SecurityGuard::new(SecurityPolicy::default())),
        ))
    }

    pub fn invocation(handler_id: &str, args: &[&str]) -> InvocationContext {
        InvocationContext {
            request_id: Uuid::new_v4(),
            handler_id: handler_id.to_string(),
            actor_id: 1,
            guild_id: None,
            channel_id: 2,
            raw_args: args.iter().map(|a| a.to_string()).collect(),
            locale: "en-US".to_string(),
            payload: Payload::None,
        }
    }
}
