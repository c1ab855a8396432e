// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler implementations for the seven declared task types.
//! Handler semantics are uniform across all of them.
//!
//! Every handler: deserializes its typed payload, resolves a
//! destination via the [`ConfigLookup`] collaborator, and calls the
//! [`Notifier`]. Missing configuration or a missing destination is not
//! an error — the task still completes so it isn't retried forever for
//! a guild that simply hasn't set up notifications.

use std::sync::Arc;
use std::time::Duration;

use relay_adapters::{ConfigLookup, Embed, Notifier};
use relay_avatar_store::ScopedCache;
use relay_core::Clock;
use relay_router::{HandlerError, Router};
use serde_json::Value;

use crate::types::*;

/// Bundles the collaborators every handler needs: the notifier, the
/// config lookup, and the avatar store. Constructed once by the daemon
/// and shared (via `Arc`) across every handler invocation.
pub struct HandlerCtx<N, L> {
    pub notifier: Arc<N>,
    pub config: Arc<L>,
    pub avatar_store: ScopedCache,
    /// Passed to `save_throttled` after every avatar-cache mutation and
    /// by the periodic flush cron.
    pub avatar_save_interval: Duration,
}

impl<N, L> HandlerCtx<N, L> {
    pub fn new(notifier: Arc<N>, config: Arc<L>, avatar_store: ScopedCache, avatar_save_interval: Duration) -> Self {
        Self {
            notifier,
            config,
            avatar_store,
            avatar_save_interval,
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, HandlerError> {
    serde_json::from_value(payload).map_err(|e| Box::new(e) as HandlerError)
}

/// Registers all seven handlers on `router`. Call once at daemon
/// startup, after constructing the shared [`HandlerCtx`].
pub fn register_handlers<N, L, C>(router: &Router<HandlerCtx<N, L>, C>)
where
    N: Notifier,
    L: ConfigLookup,
    C: Clock,
{
    router.register_handler(TASK_MEMBER_JOIN, handle_member_join);
    router.register_handler(TASK_MEMBER_LEAVE, handle_member_leave);
    router.register_handler(TASK_MESSAGE_EDIT, handle_message_edit);
    router.register_handler(TASK_MESSAGE_DELETE, handle_message_delete);
    router.register_handler(TASK_AUTOMOD_ACTION, handle_automod_action);
    router.register_handler(TASK_PROCESS_AVATAR_CHANGE, handle_process_avatar_change);
    router.register_handler(TASK_FLUSH_AVATAR_CACHE, handle_flush_avatar_cache);
}

async fn notify_if_configured<N: Notifier, L: ConfigLookup>(
    ctx: &HandlerCtx<N, L>,
    scope: &str,
    embed: Embed,
) -> Result<(), HandlerError> {
    let Some(destination) = ctx.config.notify_destination(scope) else {
        tracing::debug!(scope, "no notification destination configured, skipping");
        return Ok(());
    };
    ctx.notifier
        .send_embed(&destination, embed)
        .await
        .map_err(|e| Box::new(e) as HandlerError)
}

async fn handle_member_join<N: Notifier, L: ConfigLookup>(
    ctx: Arc<HandlerCtx<N, L>>,
    payload: Value,
) -> Result<(), HandlerError> {
    let payload: MemberJoinPayload = decode(payload)?;
    let embed = Embed::new("Member joined", &payload.member_snapshot.display_name)
        .with_field("channel", &payload.channel)
        .with_field("account_age_secs", payload.account_age_secs.to_string());
    notify_if_configured(&ctx, &payload.scope, embed).await
}

async fn handle_member_leave<N: Notifier, L: ConfigLookup>(
    ctx: Arc<HandlerCtx<N, L>>,
    payload: Value,
) -> Result<(), HandlerError> {
    let payload: MemberLeavePayload = decode(payload)?;
    let embed = Embed::new("Member left", &payload.member_snapshot.display_name)
        .with_field("channel", &payload.channel)
        .with_field("server_time_secs", payload.server_time_secs.to_string())
        .with_field("bot_time_secs", payload.bot_time_secs.to_string());
    notify_if_configured(&ctx, &payload.scope, embed).await
}

async fn handle_message_edit<N: Notifier, L: ConfigLookup>(
    ctx: Arc<HandlerCtx<N, L>>,
    payload: Value,
) -> Result<(), HandlerError> {
    let payload: MessageEditPayload = decode(payload)?;
    let embed = Embed::new("Message edited", &payload.original_snapshot.author_display_name)
        .with_field("channel", &payload.channel)
        .with_field("before", &payload.original_snapshot.content)
        .with_field("after", &payload.edit_event.new_content);
    notify_if_configured(&ctx, &payload.original_snapshot.scope, embed).await
}

async fn handle_message_delete<N: Notifier, L: ConfigLookup>(
    ctx: Arc<HandlerCtx<N, L>>,
    payload: Value,
) -> Result<(), HandlerError> {
    let payload: MessageDeletePayload = decode(payload)?;
    let embed = Embed::new("Message deleted", &payload.deleted_snapshot.author_display_name)
        .with_field("channel", &payload.channel)
        .with_field("content", &payload.deleted_snapshot.content)
        .with_field("deleted_by", &payload.deleted_by);
    notify_if_configured(&ctx, &payload.deleted_snapshot.scope, embed).await
}

async fn handle_automod_action<N: Notifier, L: ConfigLookup>(
    ctx: Arc<HandlerCtx<N, L>>,
    payload: Value,
) -> Result<(), HandlerError> {
    let payload: AutomodActionPayload = decode(payload)?;
    let mut embed = Embed::new("Automod action", &payload.event.rule)
        .with_field("channel", &payload.channel)
        .with_field("subject", &payload.event.subject_id);
    if let Some(matched) = &payload.event.matched_content {
        embed = embed.with_field("matched_content", matched);
    }
    notify_if_configured(&ctx, &payload.event.scope, embed).await
}

/// The only handler that mutates C2. Notifies first; only on success
/// (or on "no destination configured", which is a vacuous success) does
/// it commit the cache write and request a throttled save — a failed
/// notification must never be followed by a cache mutation.
async fn handle_process_avatar_change<N: Notifier, L: ConfigLookup>(
    ctx: Arc<HandlerCtx<N, L>>,
    payload: Value,
) -> Result<(), HandlerError> {
    let payload: ProcessAvatarChangePayload = decode(payload)?;
    let old_value = ctx.avatar_store.get(&payload.scope, &payload.subject);

    let mut embed = Embed::new("Avatar changed", payload.username.as_deref().unwrap_or(&payload.subject))
        .with_field("old", old_value.as_deref().unwrap_or("(none)"))
        .with_field("new", &payload.new_value);
    if let Some(username) = &payload.username {
        embed = embed.with_field("username", username);
    }
    notify_if_configured(&ctx, &payload.scope, embed).await?;

    ctx.avatar_store
        .set(&payload.scope, &payload.subject, payload.new_value.clone())
        .map_err(|e| Box::new(e) as HandlerError)?;

    if let Err(err) = ctx.avatar_store.save_throttled(ctx.avatar_save_interval) {
        tracing::warn!(scope = %payload.scope, subject = %payload.subject, error = %err, "throttled avatar save failed, will retry on next mutation");
    }
    Ok(())
}

/// Periodic maintenance: coalesced via the quantized idempotency key
/// built by [`crate::producers::flush_avatar_cache_task`]. Unlike the
/// avatar-change handler's best-effort save, this task's entire purpose
/// is the flush, so a save failure here is propagated and retried.
async fn handle_flush_avatar_cache<N: Notifier, L: ConfigLookup>(
    ctx: Arc<HandlerCtx<N, L>>,
    _payload: Value,
) -> Result<(), HandlerError> {
    ctx.avatar_store
        .save_throttled(ctx.avatar_save_interval)
        .map_err(|e| Box::new(e) as HandlerError)
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
