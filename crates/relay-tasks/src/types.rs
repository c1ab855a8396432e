// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of task types C4 declares and their payload shapes.

use serde::{Deserialize, Serialize};

pub const TASK_MEMBER_JOIN: &str = "member_join";
pub const TASK_MEMBER_LEAVE: &str = "member_leave";
pub const TASK_MESSAGE_EDIT: &str = "message_edit";
pub const TASK_MESSAGE_DELETE: &str = "message_delete";
pub const TASK_AUTOMOD_ACTION: &str = "automod_action";
pub const TASK_PROCESS_AVATAR_CHANGE: &str = "process_avatar_change";
pub const TASK_FLUSH_AVATAR_CACHE: &str = "flush_avatar_cache";

/// Minimal identity carried for a member: subject id and display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub subject_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberJoinPayload {
    pub scope: String,
    pub channel: String,
    pub member_snapshot: MemberSnapshot,
    /// Seconds; 0 means unknown.
    #[serde(default)]
    pub account_age_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLeavePayload {
    pub scope: String,
    pub channel: String,
    pub member_snapshot: MemberSnapshot,
    /// Seconds spent on the server; 0 means unknown.
    #[serde(default)]
    pub server_time_secs: u64,
    /// Seconds since the bot itself joined; 0 means unknown.
    #[serde(default)]
    pub bot_time_secs: u64,
}

/// A message as it existed before an edit or deletion. Edits/deletes
/// fetch this from C1's `message_events` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub message_id: String,
    pub scope: String,
    pub author_id: String,
    pub author_display_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditEvent {
    pub new_content: String,
    pub edited_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEditPayload {
    pub channel: String,
    pub original_snapshot: MessageSnapshot,
    pub edit_event: EditEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletePayload {
    pub channel: String,
    pub deleted_snapshot: MessageSnapshot,
    /// Free-form label: a moderator name, "author", or "unknown".
    pub deleted_by: String,
}

/// A native auto-moderation action. Exactly one of `message_id` /
/// `alert_id` should be set when a stable id exists, selecting which
/// half of the `(msg|alert)` idempotency template applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomodEvent {
    pub scope: String,
    pub rule: String,
    pub subject_id: String,
    #[serde(default)]
    pub matched_content: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub alert_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomodActionPayload {
    pub channel: String,
    pub event: AutomodEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessAvatarChangePayload {
    pub scope: String,
    pub subject: String,
    #[serde(default)]
    pub username: Option<String>,
    pub new_value: String,
}
