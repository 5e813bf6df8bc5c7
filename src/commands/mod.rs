//! # Command System
//!
//! Text prefix commands and interactions (slash commands, buttons, select
//! menus, modals) routed through one registry and dispatcher.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Unified dispatcher with permission gate and per-user cooldowns
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod descriptor;
pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod parser;
pub mod registry;

pub use context::{Actor, CommandContext, IncomingEvent, InvocationContext, Payload, Source};
pub use descriptor::{HandlerDescriptor, HandlerKind};
pub use dispatcher::{Dispatcher, IgnoreReason, Outcome};
pub use handler::Handler;
pub use handlers::{build_registry, create_all_handlers};
pub use registry::{CommandRegistry, RegisteredHandler, SharedRegistry};
