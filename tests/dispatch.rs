//! End-to-end dispatch through the built-in handler set

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::Permissions;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nebura::commands::{
    build_registry, Actor, CommandContext, Dispatcher, HandlerKind, IgnoreReason, IncomingEvent,
    Outcome, Payload, Source,
};
use nebura::core::{Denial, MockClock, ModalForm, Replier, Reply};
use nebura::features::{CooldownTracker, GuildSettings, PermissionGate, SecurityGuard, SecurityPolicy};

const OWNER: u64 = 1;
const MEMBER: u64 = 2;
const GUILD: u64 = 10;

#[derive(Default)]
struct RecordingReplier {
    sent: Mutex<Vec<Reply>>,
    modals: Mutex<Vec<ModalForm>>,
}

impl RecordingReplier {
    fn contents(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|r| r.content.clone()).collect()
    }

    fn last(&self) -> Reply {
        self.sent.lock().unwrap().last().cloned().unwrap()
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

struct Bot {
    dispatcher: Dispatcher,
    clock: MockClock,
    security: Arc<SecurityGuard>,
}

fn bot() -> Bot {
    let clock = MockClock::new();
    let security = Arc::new(SecurityGuard::with_clock(
        SecurityPolicy::default(),
        Arc::new(clock.clone()),
    ));
    let context = Arc::new(CommandContext::new(
        build_registry().unwrap().into_shared(),
        GuildSettings::new("!"),
        Arc::clone(&security),
    ));
    let dispatcher = Dispatcher::new(
        context,
        PermissionGate::new(HashSet::from([OWNER])),
        CooldownTracker::with_clock(Arc::new(clock.clone())),
    );
    Bot {
        dispatcher,
        clock,
        security,
    }
}

fn text(actor: u64, permissions: Permissions, content: &str) -> IncomingEvent {
    IncomingEvent {
        source: Source::Text(content.to_string()),
        actor: Actor::user(actor, permissions),
        guild_id: Some(GUILD),
        channel_id: 20,
        locale: "en-US".to_string(),
        bot_permissions: Permissions::SEND_MESSAGES,
    }
}

fn interaction(kind: HandlerKind, custom_id: &str, payload: Payload) -> IncomingEvent {
    IncomingEvent {
        source: Source::Interaction {
            kind,
            custom_id: custom_id.to_string(),
            args: Vec::new(),
            payload,
        },
        ..text(MEMBER, Permissions::empty(), "")
    }
}

fn executed(id: &str) -> Outcome {
    Outcome::Executed {
        handler_id: id.to_string(),
    }
}

#[tokio::test]
async fn ping_via_alias() {
    let bot = bot();
    let replier = RecordingReplier::default();

    let outcome = bot
        .dispatcher
        .dispatch(text(MEMBER, Permissions::empty(), "!LATENCY"), &replier)
        .await;

    assert_eq!(outcome, executed("ping"));
    assert_eq!(replier.contents(), vec!["🏓 Pong!"]);
}

#[tokio::test]
async fn prefix_change_requires_manage_guild_and_takes_effect() {
    let bot = bot();
    let replier = RecordingReplier::default();

    let denied = bot
        .dispatcher
        .dispatch(text(MEMBER, Permissions::SEND_MESSAGES, "!prefix ?"), &replier)
        .await;
    assert!(matches!(
        denied,
        Outcome::Denied {
            denial: Denial::InsufficientUserPermissions { .. },
            ..
        }
    ));
    assert!(replier.last().ephemeral);

    let changed = bot
        .dispatcher
        .dispatch(text(MEMBER, Permissions::MANAGE_GUILD, "!prefix ?"), &replier)
        .await;
    assert_eq!(changed, executed("prefix"));

    let old = bot
        .dispatcher
        .dispatch(text(MEMBER, Permissions::empty(), "!ping"), &replier)
        .await;
    let new = bot
        .dispatcher
        .dispatch(text(MEMBER, Permissions::empty(), "?ping"), &replier)
        .await;
    assert_eq!(old, Outcome::Ignored(IgnoreReason::MissingPrefix));
    assert_eq!(new, executed("ping"));
}

#[tokio::test]
async fn prefix_cooldown_is_per_user() {
    let bot = bot();
    let replier = RecordingReplier::default();
    let admin = |id| text(id, Permissions::ADMINISTRATOR, "!prefix");

    assert_eq!(bot.dispatcher.dispatch(admin(MEMBER), &replier).await, executed("prefix"));
    assert_eq!(
        bot.dispatcher.dispatch(admin(MEMBER), &replier).await,
        Outcome::Denied {
            handler_id: "prefix".to_string(),
            denial: Denial::CooldownActive { remaining_ms: 10_000 },
        }
    );
    assert_eq!(bot.dispatcher.dispatch(admin(3), &replier).await, executed("prefix"));

    bot.clock.advance(Duration::from_secs(10));
    assert_eq!(bot.dispatcher.dispatch(admin(MEMBER), &replier).await, executed("prefix"));
}

#[tokio::test]
async fn block_commands_are_owner_only() {
    let bot = bot();
    let replier = RecordingReplier::default();
    let ip: IpAddr = "198.51.100.7".parse().unwrap();

    let denied = bot
        .dispatcher
        .dispatch(text(MEMBER, Permissions::all(), "!blockip 198.51.100.7"), &replier)
        .await;
    assert_eq!(
        denied,
        Outcome::Denied {
            handler_id: "blockip".to_string(),
            denial: Denial::OwnerOnly,
        }
    );
    assert!(!bot.security.blocker().is_blocked(ip));

    let blocked = bot
        .dispatcher
        .dispatch(
            text(OWNER, Permissions::empty(), "!blockip 198.51.100.7 1 crawler"),
            &replier,
        )
        .await;
    assert_eq!(blocked, executed("blockip"));
    assert_eq!(bot.security.blocker().get(ip).unwrap().blocked_by, "1");

    bot.clock.advance(Duration::from_secs(3601));
    assert!(!bot.security.blocker().is_blocked(ip));
}

#[tokio::test]
async fn help_buttons_route_back_to_handlers() {
    let bot = bot();
    let replier = RecordingReplier::default();

    bot.dispatcher
        .dispatch(text(MEMBER, Permissions::empty(), "!help"), &replier)
        .await;
    let buttons = replier.last().buttons;
    assert_eq!(buttons.len(), 2);

    for button in &buttons {
        let outcome = bot
            .dispatcher
            .dispatch(
                interaction(HandlerKind::Button, &button.custom_id, Payload::None),
                &replier,
            )
            .await;
        assert_eq!(outcome, executed(&button.custom_id));
    }
    assert_eq!(replier.modals.lock().unwrap()[0].custom_id, "feedback_modal");
}

#[tokio::test]
async fn feedback_submission_and_kind_mismatch() {
    let bot = bot();
    let replier = RecordingReplier::default();
    let fields = HashMap::from([("message".to_string(), "more commands".to_string())]);

    let submitted = bot
        .dispatcher
        .dispatch(
            interaction(HandlerKind::Modal, "feedback_modal", Payload::Fields(fields)),
            &replier,
        )
        .await;
    assert_eq!(submitted, executed("feedback_modal"));

    // Component ids are not reachable as text commands
    let typed = bot
        .dispatcher
        .dispatch(text(MEMBER, Permissions::empty(), "!feedback_modal"), &replier)
        .await;
    assert_eq!(typed, Outcome::Ignored(IgnoreReason::KindMismatch));
}
