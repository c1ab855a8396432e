// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook-based [`Notifier`]: posts an embed as a JSON payload to a
//! per-destination webhook URL resolved by the caller.

use crate::notifier::{Embed, Notifier, NotifierError};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts embeds to chat-platform webhook URLs over HTTPS.
///
/// `destination` passed to [`Notifier::send_embed`] is the full webhook
/// URL; resolving a scope to its webhook URL is the `ConfigLookup`
/// collaborator's job, not this adapter's.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for WebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_embed(&self, destination: &str, embed: Embed) -> Result<(), NotifierError> {
        let body = serde_json::json!({
            "embeds": [{
                "title": embed.title,
                "description": embed.description,
                "fields": embed.fields.iter().map(|(name, value)| {
                    serde_json::json!({ "name": name, "value": value })
                }).collect::<Vec<_>>(),
            }],
        });

        let response = self
            .client
            .post(destination)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifierError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifierError::RequestFailed(format!(
                "webhook responded with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
