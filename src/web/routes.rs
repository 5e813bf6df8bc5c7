//! API route handlers

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::PoisonError;

use super::ApiState;
use crate::commands::HandlerKind;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct CommandDto {
    pub id: String,
    pub aliases: Vec<String>,
    pub kind: HandlerKind,
    pub description: String,
    pub owner_only: bool,
    pub cooldown_seconds: u64,
    pub user_permissions: Vec<&'static str>,
    pub bot_permissions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct BlockDto {
    pub ip: String,
    pub reason: String,
    pub blocked_by: String,
    pub blocked_at: DateTime<Utc>,
    pub remaining_secs: u64,
}

pub async fn health(State(state): State<ApiState>) -> Json<ApiResponse<HealthDto>> {
    ApiResponse::ok(HealthDto {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

pub async fn list_commands(State(state): State<ApiState>) -> Json<ApiResponse<Vec<CommandDto>>> {
    let descriptors = state
        .registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .descriptors();

    let commands = descriptors
        .iter()
        .map(|d| CommandDto {
            id: d.id.clone(),
            aliases: d.aliases.clone(),
            kind: d.kind,
            description: d.description.clone(),
            owner_only: d.owner_only,
            cooldown_seconds: d.cooldown_seconds,
            user_permissions: d.required_user_permissions.get_permission_names(),
            bot_permissions: d.required_bot_permissions.get_permission_names(),
        })
        .collect();

    ApiResponse::ok(commands)
}

pub async fn list_blocks(State(state): State<ApiState>) -> Json<ApiResponse<Vec<BlockDto>>> {
    let blocker = state.security.blocker();
    let now = blocker.now();

    let blocks = blocker
        .entries()
        .into_iter()
        .map(|entry| BlockDto {
            ip: entry.ip.to_string(),
            remaining_secs: entry.remaining(now).as_secs(),
            reason: entry.reason,
            blocked_by: entry.blocked_by,
            blocked_at: entry.blocked_at,
        })
        .collect();

    ApiResponse::ok(blocks)
}
