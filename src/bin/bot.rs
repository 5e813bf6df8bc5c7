use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use nebura::commands::{build_registry, CommandContext, Dispatcher, Outcome, SharedRegistry};
use nebura::core::Config;
use nebura::discord::{self, ChannelReplier, InteractionReplier, InteractionSource};
use nebura::features::guild_settings::GuildSettingsFile;
use nebura::features::{
    CooldownTracker, GuildSettings, PermissionGate, RateLimitConfig, RateLimiter, SecurityGuard,
    SecurityPolicy,
};
use nebura::web::{self, ApiState, RouteGuard};

struct Handler {
    dispatcher: Arc<Dispatcher>,
    registry: SharedRegistry,
}

impl Handler {
    fn log_outcome(outcome: &Outcome) {
        match outcome {
            Outcome::Ignored(_) => {}
            other => debug!("Dispatch finished: {other:?}"),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let event = discord::from_message(&ctx, &msg);
        let replier = ChannelReplier::new(ctx.http.clone(), msg.channel_id);
        let outcome = self.dispatcher.dispatch(event, &replier).await;
        Self::log_outcome(&outcome);
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        let descriptors = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .descriptors();
        if let Err(e) = discord::register_global_commands(&ctx.http, &descriptors).await {
            error!("Failed to register global slash commands: {e}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let (event, source) = match interaction {
            Interaction::ApplicationCommand(command) => {
                (discord::from_command(&command), InteractionSource::Command(command))
            }
            Interaction::MessageComponent(component) => (
                discord::from_component(&component),
                InteractionSource::Component(component),
            ),
            Interaction::ModalSubmit(modal) => {
                (discord::from_modal(&modal), InteractionSource::Modal(modal))
            }
            _ => return,
        };

        let replier = InteractionReplier::new(ctx.http.clone(), source);
        let outcome = self.dispatcher.dispatch(event, &replier).await;
        Self::log_outcome(&outcome);
    }
}

fn load_guild_settings(config: &Config) -> GuildSettings {
    let settings = GuildSettings::new(config.default_prefix.clone());

    if let Some(path) = &config.guild_settings_path {
        match GuildSettingsFile::load(path) {
            Ok(file) => {
                settings.apply(file);
            }
            Err(e) => {
                if Path::new(path).exists() {
                    error!("❌ Failed to load guild settings from {path}: {e:?}");
                } else {
                    info!("📄 No guild settings found at {path} - using default prefix everywhere");
                }
            }
        }
    }
    settings
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Nebura Discord Bot...");

    // A name collision is a programming error; refuse to boot
    let registry = build_registry()
        .map_err(|e| {
            error!("Handler registration failed: {e}");
            anyhow!("Handler registration failed: {}", e)
        })?
        .into_shared();
    info!(
        "📋 Registered {} handlers",
        registry.read().unwrap_or_else(PoisonError::into_inner).len()
    );

    let security = Arc::new(SecurityGuard::new(SecurityPolicy::default()));
    let context = Arc::new(CommandContext::new(
        Arc::clone(&registry),
        load_guild_settings(&config),
        Arc::clone(&security),
    ));
    let cooldowns = CooldownTracker::new();
    let dispatcher = Arc::new(
        Dispatcher::new(
            context,
            PermissionGate::new(config.owner_ids.clone()),
            cooldowns.clone(),
        )
        .with_owner_bypass(config.owner_cooldown_bypass),
    );
    info!(
        "👑 {} bot owners configured (cooldown bypass: {:?})",
        config.owner_ids.len(),
        config.owner_cooldown_bypass
    );

    // HTTP API
    let limits = RateLimitConfig::new(config.rate_limit_window_ms, config.rate_limit_max_requests);
    let commands_guard = RouteGuard::new(
        RateLimiter::new(limits),
        Arc::clone(&security),
        config.trust_proxy,
    );
    let blocks_guard = RouteGuard::new(
        RateLimiter::new(limits),
        Arc::clone(&security),
        config.trust_proxy,
    );
    let limiters = vec![commands_guard.limiter().clone(), blocks_guard.limiter().clone()];
    let app = web::router(
        ApiState::new(Arc::clone(&registry), Arc::clone(&security)),
        commands_guard,
        blocks_guard,
    );

    let listener = tokio::net::TcpListener::bind(config.http_bind_addr).await?;
    info!("🌐 HTTP API listening on {}", config.http_bind_addr);
    tokio::spawn(async move {
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        if let Err(e) = axum::serve(listener, service).await {
            error!("HTTP server stopped: {e}");
        }
    });

    // Expired cooldowns and rate limit windows are otherwise only dropped when touched again
    let sweep_interval = Duration::from_secs(config.cooldown_sweep_secs.max(1));
    let sweep_security = Arc::clone(&security);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let cooldowns_removed = cooldowns.sweep();
            let windows_removed: usize = limiters.iter().map(RateLimiter::sweep).sum();
            let violations_removed = sweep_security.sweep();
            if cooldowns_removed + windows_removed + violations_removed > 0 {
                debug!(
                    "Swept {cooldowns_removed} cooldowns, {windows_removed} rate limit windows \
                     and {violations_removed} violation records"
                );
            }
        }
    });

    let handler = Handler {
        dispatcher,
        registry,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow!("Failed to establish gateway connection: {}", why));
    }

    Ok(())
}
