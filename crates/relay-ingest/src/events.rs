// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw platform event shapes consumed by the ingest services.
//!
//! These are the ingest-side counterpart of the chat-platform's native
//! gateway events. The platform client itself is out of scope; a
//! concrete subscriber adapter decodes the platform's wire format into
//! these structs and calls the matching service's `handle`.

#[derive(Debug, Clone)]
pub struct RawMemberJoin {
    pub scope: String,
    pub channel: String,
    pub subject_id: String,
    pub display_name: String,
    pub is_bot: bool,
    pub account_age_secs: u64,
}

#[derive(Debug, Clone)]
pub struct RawMemberLeave {
    pub scope: String,
    pub channel: String,
    pub subject_id: String,
    pub display_name: String,
    pub is_bot: bool,
    pub server_time_secs: u64,
    pub bot_time_secs: u64,
}

/// Emitted when a message is first posted, so the ingest layer can
/// remember its content for a later edit/delete by consulting C1 to
/// obtain the original snapshot.
#[derive(Debug, Clone)]
pub struct RawMessageCreate {
    pub scope: String,
    pub message_id: String,
    pub author_id: String,
    pub author_display_name: String,
    pub content: String,
    pub is_bot: bool,
}

#[derive(Debug, Clone)]
pub struct RawMessageEdit {
    pub scope: String,
    pub channel: String,
    pub message_id: String,
    pub is_bot: bool,
    pub new_content: String,
    pub edited_at: String,
}

#[derive(Debug, Clone)]
pub struct RawMessageDelete {
    pub scope: String,
    pub channel: String,
    pub message_id: String,
    pub is_bot: bool,
    pub deleted_by: String,
}

#[derive(Debug, Clone)]
pub struct RawAutomodAction {
    pub scope: String,
    pub channel: String,
    pub rule: String,
    pub subject_id: String,
    pub is_bot: bool,
    pub matched_content: Option<String>,
    pub message_id: Option<String>,
    pub alert_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawAvatarChange {
    pub scope: String,
    pub subject_id: String,
    pub is_bot: bool,
    pub username: Option<String>,
    pub new_value: String,
}
