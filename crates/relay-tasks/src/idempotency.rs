// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotency-key templates for each task type.
//!
//! Join/leave and edit/delete deliberately share a single dedupe key:
//! `"join|leave:<scope>:<subject>"` and `"edit|delete:<scope>:<message>"`.
//! That is not a typo to "fix" into two separate templates — a join and
//! a leave (or an edit and a delete) for the same subject/message
//! within the window collapse to one notification, which is the
//! intended behavior.

use std::time::Duration;

pub const JOIN_LEAVE_TTL: Duration = Duration::from_secs(10);
pub const EDIT_DELETE_TTL: Duration = Duration::from_secs(10);
pub const AUTOMOD_TTL: Duration = Duration::from_secs(600);
pub const AVATAR_CHANGE_TTL: Duration = Duration::from_secs(60);
pub const AVATAR_FLUSH_TTL: Duration = Duration::from_secs(5);

/// `"join|leave:<scope>:<subject>"`.
pub fn join_leave_key(scope: &str, subject: &str) -> String {
    format!("join|leave:{scope}:{subject}")
}

/// `"edit|delete:<scope>:<message>"`.
pub fn edit_delete_key(scope: &str, message_id: &str) -> String {
    format!("edit|delete:{scope}:{message_id}")
}

/// `"automod:<scope>:<rule>:<subject>:(msg|alert):<id>"` when a stable
/// id exists; empty otherwise so the dispatch never drops an automod
/// action purely for lacking one.
pub fn automod_key(
    scope: &str,
    rule: &str,
    subject: &str,
    message_id: Option<&str>,
    alert_id: Option<&str>,
) -> String {
    match (message_id, alert_id) {
        (Some(id), _) if !id.is_empty() => format!("automod:{scope}:{rule}:{subject}:msg:{id}"),
        (_, Some(id)) if !id.is_empty() => format!("automod:{scope}:{rule}:{subject}:alert:{id}"),
        _ => String::new(),
    }
}

/// `"avatar:<scope>:<subject>:<new_value>"`.
pub fn avatar_change_key(scope: &str, subject: &str, new_value: &str) -> String {
    format!("avatar:{scope}:{subject}:{new_value}")
}

/// `"avatar_flush:<floor(now/5s)>"`, coalescing bursts of flush
/// requests arriving within the same 5-second bucket into one dispatch.
pub fn avatar_flush_key(now_unix_secs: i64) -> String {
    format!("avatar_flush:{}", now_unix_secs.div_euclid(5))
}

#[cfg(test)]
#[path = "idempotency_tests.rs"]
mod tests;
