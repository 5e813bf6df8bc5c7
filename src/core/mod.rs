//! # Core Module
//!
//! Configuration, time, replies and the error taxonomy shared by every layer.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod clock;
pub mod config;
pub mod error;
pub mod response;

pub use clock::{Clock, MockClock, SystemClock};
pub use config::{Config, OwnerCooldownBypass};
pub use error::{Denial, RegistryError};
pub use response::{ModalField, ModalForm, Replier, Reply, ReplyButton, FAILURE_NOTICE, MESSAGE_LIMIT};
