// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-tasks: the notification adapters layer (C4).
//!
//! Declares the closed set of task types the router dispatches,
//! their payload shapes, the idempotency-key templates each type
//! resolves to, and the handler implementations that call out to the
//! notifier, the avatar store, and the config-lookup collaborators.

mod handlers;
mod idempotency;
mod producers;
mod types;

pub use handlers::{register_handlers, HandlerCtx};
pub use producers::{
    automod_action_task, flush_avatar_cache_task, member_join_task, member_leave_task,
    message_delete_task, message_edit_task, process_avatar_change_task,
};
pub use types::{
    AutomodActionPayload, AutomodEvent, EditEvent, MemberJoinPayload, MemberLeavePayload,
    MemberSnapshot, MessageDeletePayload, MessageEditPayload, MessageSnapshot,
    ProcessAvatarChangePayload, TASK_AUTOMOD_ACTION, TASK_FLUSH_AVATAR_CACHE, TASK_MEMBER_JOIN,
    TASK_MEMBER_LEAVE, TASK_MESSAGE_DELETE, TASK_MESSAGE_EDIT, TASK_PROCESS_AVATAR_CHANGE,
};
