// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-ingest: the event ingest services (C5).
//!
//! Subscribes to raw platform events, filters bots and unconfigured
//! scopes, consults C1 for edit/delete originals and the avatar-change
//! debounce window, then hands a task off to C4 (`relay-tasks`) through
//! the [`Dispatcher`] seam — never calling the notifier directly.

mod debounce;
mod dispatch;
mod events;
mod message_store;
mod services;

pub use debounce::{AvatarDebounce, AVATAR_DEBOUNCE_WINDOW};
pub use dispatch::{DispatchRejected, Dispatcher};
pub use events::{
    RawAutomodAction, RawAvatarChange, RawMemberJoin, RawMemberLeave, RawMessageCreate,
    RawMessageDelete, RawMessageEdit,
};
pub use message_store::{MessageEventsStore, DEFAULT_MESSAGE_EVENTS_TTL};
pub use services::{
    AlreadyRunning, AutomodService, AvatarChangeService, MemberJoinService, MemberLeaveService,
    MessageCreateService, MessageDeleteService, MessageEditService,
};

#[cfg(any(test, feature = "test-support"))]
pub use dispatch::FakeDispatcher;
