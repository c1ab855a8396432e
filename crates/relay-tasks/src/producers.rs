// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds [`Task`]s for each declared type, attaching the right
//! idempotency template and TTL. Event ingest services (C5) call these
//! instead of constructing `Task`s by hand.
//!
//! Every producer groups by `scope`: notifications for the same scope
//! serialize through one group worker, so a burst of joins/leaves/edits
//! for one guild is delivered in event order without needing a
//! dedicated ordering layer per notification kind.

use crate::idempotency;
use crate::types::*;
use relay_core::task::{Task, TaskOptions};

fn options_for(scope: &str, idempotency_key: String, ttl: std::time::Duration) -> TaskOptions {
    let mut opts = TaskOptions::default().with_group(scope);
    if !idempotency_key.is_empty() {
        opts = opts.with_idempotency(idempotency_key, ttl);
    }
    opts
}

pub fn member_join_task(payload: MemberJoinPayload) -> Task {
    let key = idempotency::join_leave_key(&payload.scope, &payload.member_snapshot.subject_id);
    let options = options_for(&payload.scope, key, idempotency::JOIN_LEAVE_TTL);
    Task::new(TASK_MEMBER_JOIN, serde_json::json!(payload)).with_options(options)
}

pub fn member_leave_task(payload: MemberLeavePayload) -> Task {
    let key = idempotency::join_leave_key(&payload.scope, &payload.member_snapshot.subject_id);
    let options = options_for(&payload.scope, key, idempotency::JOIN_LEAVE_TTL);
    Task::new(TASK_MEMBER_LEAVE, serde_json::json!(payload)).with_options(options)
}

pub fn message_edit_task(payload: MessageEditPayload) -> Task {
    let key = idempotency::edit_delete_key(
        &payload.original_snapshot.scope,
        &payload.original_snapshot.message_id,
    );
    let options = options_for(&payload.original_snapshot.scope, key, idempotency::EDIT_DELETE_TTL);
    Task::new(TASK_MESSAGE_EDIT, serde_json::json!(payload)).with_options(options)
}

pub fn message_delete_task(payload: MessageDeletePayload) -> Task {
    let key = idempotency::edit_delete_key(
        &payload.deleted_snapshot.scope,
        &payload.deleted_snapshot.message_id,
    );
    let options = options_for(&payload.deleted_snapshot.scope, key, idempotency::EDIT_DELETE_TTL);
    Task::new(TASK_MESSAGE_DELETE, serde_json::json!(payload)).with_options(options)
}

pub fn automod_action_task(payload: AutomodActionPayload) -> Task {
    let key = idempotency::automod_key(
        &payload.event.scope,
        &payload.event.rule,
        &payload.event.subject_id,
        payload.event.message_id.as_deref(),
        payload.event.alert_id.as_deref(),
    );
    let options = options_for(&payload.event.scope, key, idempotency::AUTOMOD_TTL);
    Task::new(TASK_AUTOMOD_ACTION, serde_json::json!(payload)).with_options(options)
}

pub fn process_avatar_change_task(payload: ProcessAvatarChangePayload) -> Task {
    let key = idempotency::avatar_change_key(&payload.scope, &payload.subject, &payload.new_value);
    let options = options_for(&payload.scope, key, idempotency::AVATAR_CHANGE_TTL);
    Task::new(TASK_PROCESS_AVATAR_CHANGE, serde_json::json!(payload)).with_options(options)
}

/// `now_unix_secs` is injected (rather than read from the wall clock
/// here) so callers can control bucketing precisely in tests.
pub fn flush_avatar_cache_task(now_unix_secs: i64) -> Task {
    let key = idempotency::avatar_flush_key(now_unix_secs);
    let options = options_for("_avatar_flush", key, idempotency::AVATAR_FLUSH_TTL);
    Task::new(TASK_FLUSH_AVATAR_CACHE, serde_json::Value::Null).with_options(options)
}

#[cfg(test)]
#[path = "producers_tests.rs"]
mod tests;
