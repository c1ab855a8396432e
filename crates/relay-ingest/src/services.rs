// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event ingest services (C5): one per platform event, each
//! filtering bots and unconfigured scopes before handing a task off to
//! C4. None of these call the notifier directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use relay_adapters::ConfigLookup;
use thiserror::Error;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::events::{
    RawAutomodAction, RawAvatarChange, RawMemberJoin, RawMemberLeave, RawMessageCreate,
    RawMessageDelete, RawMessageEdit,
};
use crate::message_store::MessageEventsStore;
use crate::AvatarDebounce;
use relay_tasks::{
    automod_action_task, member_join_task, member_leave_task, message_delete_task,
    message_edit_task, process_avatar_change_task, AutomodActionPayload, AutomodEvent,
    EditEvent, MemberJoinPayload, MemberLeavePayload, MemberSnapshot, MessageDeletePayload,
    MessageEditPayload, MessageSnapshot, ProcessAvatarChangePayload,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("service already running")]
pub struct AlreadyRunning;

/// Idempotent start/filter bookkeeping shared by every service below.
/// Not `Clone`: a service is meant to be started once and handed
/// events for its lifetime, matching the daemon's single-owner worker
/// handles.
struct ServiceCore {
    started: AtomicBool,
    config: Arc<dyn ConfigLookup>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ServiceCore {
    fn new(config: Arc<dyn ConfigLookup>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            started: AtomicBool::new(false),
            config,
            dispatcher,
        }
    }

    fn start(&self) -> Result<(), AlreadyRunning> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AlreadyRunning);
        }
        Ok(())
    }

    /// `true` if the event should be dropped (bot, or scope not
    /// configured).
    fn should_drop(&self, scope: &str, is_bot: bool) -> bool {
        if is_bot {
            debug!(scope, "dropping bot-originated event");
            return true;
        }
        if !self.config.is_configured(scope) {
            debug!(scope, "dropping event for unconfigured scope");
            return true;
        }
        false
    }
}

pub struct MemberJoinService {
    core: ServiceCore,
}

impl MemberJoinService {
    pub fn new(config: Arc<dyn ConfigLookup>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            core: ServiceCore::new(config, dispatcher),
        }
    }

    pub fn start(&self) -> Result<(), AlreadyRunning> {
        self.core.start()
    }

    pub async fn handle(&self, event: RawMemberJoin) {
        if self.core.should_drop(&event.scope, event.is_bot) {
            return;
        }
        let payload = MemberJoinPayload {
            scope: event.scope,
            channel: event.channel,
            member_snapshot: MemberSnapshot {
                subject_id: event.subject_id,
                display_name: event.display_name,
            },
            account_age_secs: event.account_age_secs,
        };
        let _ = self.core.dispatcher.dispatch_task(member_join_task(payload)).await;
    }
}

pub struct MemberLeaveService {
    core: ServiceCore,
}

impl MemberLeaveService {
    pub fn new(config: Arc<dyn ConfigLookup>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            core: ServiceCore::new(config, dispatcher),
        }
    }

    pub fn start(&self) -> Result<(), AlreadyRunning> {
        self.core.start()
    }

    pub async fn handle(&self, event: RawMemberLeave) {
        if self.core.should_drop(&event.scope, event.is_bot) {
            return;
        }
        let payload = MemberLeavePayload {
            scope: event.scope,
            channel: event.channel,
            member_snapshot: MemberSnapshot {
                subject_id: event.subject_id,
                display_name: event.display_name,
            },
            server_time_secs: event.server_time_secs,
            bot_time_secs: event.bot_time_secs,
        };
        let _ = self.core.dispatcher.dispatch_task(member_leave_task(payload)).await;
    }
}

/// Not one of the event-filtering services itself, but the thing that
/// populates C1's `message_events` map those services consult. Kept
/// separate so the edit/delete services stay pure lookups.
pub struct MessageCreateService {
    started: AtomicBool,
    store: MessageEventsStore,
}

impl MessageCreateService {
    pub fn new(store: MessageEventsStore) -> Self {
        Self {
            started: AtomicBool::new(false),
            store,
        }
    }

    pub fn start(&self) -> Result<(), AlreadyRunning> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AlreadyRunning);
        }
        Ok(())
    }

    pub fn handle(&self, event: RawMessageCreate) {
        if event.is_bot {
            return;
        }
        self.store.record(
            &event.scope,
            MessageSnapshot {
                message_id: event.message_id,
                scope: event.scope.clone(),
                author_id: event.author_id,
                author_display_name: event.author_display_name,
                content: event.content,
            },
        );
    }
}

pub struct MessageEditService {
    core: ServiceCore,
    store: MessageEventsStore,
}

impl MessageEditService {
    pub fn new(config: Arc<dyn ConfigLookup>, dispatcher: Arc<dyn Dispatcher>, store: MessageEventsStore) -> Self {
        Self {
            core: ServiceCore::new(config, dispatcher),
            store,
        }
    }

    pub fn start(&self) -> Result<(), AlreadyRunning> {
        self.core.start()
    }

    pub async fn handle(&self, event: RawMessageEdit) {
        if self.core.should_drop(&event.scope, event.is_bot) {
            return;
        }
        let Some(original_snapshot) = self.store.get(&event.scope, &event.message_id) else {
            debug!(scope = %event.scope, message_id = %event.message_id, "no original snapshot for edit, dropping");
            return;
        };
        let payload = MessageEditPayload {
            channel: event.channel,
            original_snapshot,
            edit_event: EditEvent {
                new_content: event.new_content,
                edited_at: event.edited_at,
            },
        };
        let _ = self.core.dispatcher.dispatch_task(message_edit_task(payload)).await;
    }
}

pub struct MessageDeleteService {
    core: ServiceCore,
    store: MessageEventsStore,
}

impl MessageDeleteService {
    pub fn new(config: Arc<dyn ConfigLookup>, dispatcher: Arc<dyn Dispatcher>, store: MessageEventsStore) -> Self {
        Self {
            core: ServiceCore::new(config, dispatcher),
            store,
        }
    }

    pub fn start(&self) -> Result<(), AlreadyRunning> {
        self.core.start()
    }

    pub async fn handle(&self, event: RawMessageDelete) {
        if self.core.should_drop(&event.scope, event.is_bot) {
            return;
        }
        let Some(deleted_snapshot) = self.store.get(&event.scope, &event.message_id) else {
            debug!(scope = %event.scope, message_id = %event.message_id, "no original snapshot for delete, dropping");
            return;
        };
        self.store.delete(&event.scope, &event.message_id);
        let payload = MessageDeletePayload {
            channel: event.channel,
            deleted_snapshot,
            deleted_by: event.deleted_by,
        };
        let _ = self.core.dispatcher.dispatch_task(message_delete_task(payload)).await;
    }
}

pub struct AutomodService {
    core: ServiceCore,
}

impl AutomodService {
    pub fn new(config: Arc<dyn ConfigLookup>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            core: ServiceCore::new(config, dispatcher),
        }
    }

    pub fn start(&self) -> Result<(), AlreadyRunning> {
        self.core.start()
    }

    pub async fn handle(&self, event: RawAutomodAction) {
        if self.core.should_drop(&event.scope, event.is_bot) {
            return;
        }
        let payload = AutomodActionPayload {
            channel: event.channel,
            event: AutomodEvent {
                scope: event.scope,
                rule: event.rule,
                subject_id: event.subject_id,
                matched_content: event.matched_content,
                message_id: event.message_id,
                alert_id: event.alert_id,
            },
        };
        let _ = self.core.dispatcher.dispatch_task(automod_action_task(payload)).await;
    }
}

pub struct AvatarChangeService {
    core: ServiceCore,
    debounce: AvatarDebounce,
}

impl AvatarChangeService {
    pub fn new(config: Arc<dyn ConfigLookup>, dispatcher: Arc<dyn Dispatcher>, debounce: AvatarDebounce) -> Self {
        Self {
            core: ServiceCore::new(config, dispatcher),
            debounce,
        }
    }

    pub fn start(&self) -> Result<(), AlreadyRunning> {
        self.core.start()
    }

    pub async fn handle(&self, event: RawAvatarChange) {
        if self.core.should_drop(&event.scope, event.is_bot) {
            return;
        }
        if self
            .debounce
            .check_and_record(&event.scope, &event.subject_id, &event.new_value)
        {
            debug!(scope = %event.scope, subject = %event.subject_id, "avatar change within debounce window, dropping");
            return;
        }
        let payload = ProcessAvatarChangePayload {
            scope: event.scope,
            subject: event.subject_id,
            username: event.username,
            new_value: event.new_value,
        };
        let _ = self
            .core
            .dispatcher
            .dispatch_task(process_avatar_change_task(payload))
            .await;
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
