//! Feature modules backing the dispatch pipeline and the HTTP boundary

pub mod cooldowns;
pub mod guild_settings;
pub mod permissions;
pub mod rate_limiting;

pub use cooldowns::{CooldownStatus, CooldownTracker};
pub use guild_settings::GuildSettings;
pub use permissions::PermissionGate;
pub use rate_limiting::{RateLimitConfig, RateLimiter, SecurityDenial, SecurityGuard, SecurityPolicy};
