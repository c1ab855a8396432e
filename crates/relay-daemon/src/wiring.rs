// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles C2-C5 from a loaded [`Config`]: the avatar store, the
//! notifier/config-lookup collaborators, the router with its handlers
//! and flush cron, and the event ingest services.
//!
//! A concrete chat-platform subscriber that decodes the wire protocol
//! into `relay_ingest`'s raw event structs and calls the matching
//! service's `handle` is out of scope and not built here; this module
//! wires everything up to the point a subscriber would plug in.

use std::sync::Arc;

use relay_adapters::{ConfigLookup, TomlConfigLookup, WebhookNotifier};
use relay_avatar_store::ScopedCache;
use relay_core::clock::SystemClock;
use relay_ingest::{
    AvatarChangeService, AvatarDebounce, AutomodService, Dispatcher, MemberJoinService,
    MemberLeaveService, MessageCreateService, MessageDeleteService, MessageEditService,
    MessageEventsStore,
};
use relay_router::Router;
use relay_tasks::HandlerCtx;

use crate::config::Config;

pub type AppCtx = HandlerCtx<WebhookNotifier, TomlConfigLookup>;
pub type AppRouter = Router<AppCtx, SystemClock>;

pub struct IngestServices {
    pub member_join: MemberJoinService,
    pub member_leave: MemberLeaveService,
    pub message_create: MessageCreateService,
    pub message_edit: MessageEditService,
    pub message_delete: MessageDeleteService,
    pub automod: AutomodService,
    pub avatar_change: AvatarChangeService,
}

pub struct Daemon {
    pub router: AppRouter,
    pub avatar_store: ScopedCache,
    pub ingest: IngestServices,
}

/// Builds the full collaborator graph. Must be called from within a
/// Tokio runtime (the router and C1 maps spawn background sweep tasks).
pub fn build(config: &Config) -> Daemon {
    let avatar_store = ScopedCache::new(&config.avatar_cache_path);
    if let Err(err) = avatar_store.load() {
        tracing::warn!(error = %err, "failed to load avatar cache, starting empty");
    }

    let notifier = Arc::new(WebhookNotifier::new());
    let config_lookup = Arc::new(TomlConfigLookup::load(&config.config_path));

    let ctx = Arc::new(HandlerCtx::new(
        Arc::clone(&notifier),
        Arc::clone(&config_lookup),
        avatar_store.clone(),
        config.avatar_save_interval,
    ));
    let router: AppRouter = Router::new(config.router.clone(), ctx);
    relay_tasks::register_handlers(&router);

    // Rebuilt fresh on every tick, not cloned from a task fixed at
    // registration time: the flush task's idempotency key is bucketed
    // by dispatch time, so a key computed once at boot would go stale
    // and (if `avatar_flush_interval` is ever configured below the
    // flush task's own TTL) reject every flush after the first forever.
    router.register_cron_with(config.avatar_flush_interval, || {
        relay_tasks::flush_avatar_cache_task(unix_now_secs())
    });

    let dispatcher: Arc<dyn Dispatcher> = Arc::new(router.clone());
    let config_lookup: Arc<dyn ConfigLookup> = config_lookup;
    let message_store = MessageEventsStore::new();
    let debounce = AvatarDebounce::new();

    let ingest = IngestServices {
        member_join: MemberJoinService::new(Arc::clone(&config_lookup), Arc::clone(&dispatcher)),
        member_leave: MemberLeaveService::new(Arc::clone(&config_lookup), Arc::clone(&dispatcher)),
        message_create: MessageCreateService::new(message_store.clone()),
        message_edit: MessageEditService::new(
            Arc::clone(&config_lookup),
            Arc::clone(&dispatcher),
            message_store.clone(),
        ),
        message_delete: MessageDeleteService::new(
            Arc::clone(&config_lookup),
            Arc::clone(&dispatcher),
            message_store,
        ),
        automod: AutomodService::new(Arc::clone(&config_lookup), Arc::clone(&dispatcher)),
        avatar_change: AvatarChangeService::new(config_lookup, dispatcher, debounce),
    };

    // Each service is freshly constructed above, so `start` cannot
    // observe `AlreadyRunning` here; the result is surfaced only once a
    // platform subscriber calls `start` again on a running daemon.
    let _ = ingest.member_join.start();
    let _ = ingest.member_leave.start();
    let _ = ingest.message_create.start();
    let _ = ingest.message_edit.start();
    let _ = ingest.message_delete.start();
    let _ = ingest.automod.start();
    let _ = ingest.avatar_change.start();

    Daemon {
        router,
        avatar_store,
        ingest,
    }
}

fn unix_now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
