// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notifier::Embed;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn send_embed_posts_expected_json_body() {
    let server = MockServer::start().await;
    let expected_body = serde_json::json!({
        "embeds": [{
            "title": "joined",
            "description": "welcome",
            "fields": [{"name": "age", "value": "3d"}],
        }]
    });
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new();
    let embed = Embed::new("joined", "welcome").with_field("age", "3d");
    let destination = format!("{}/hook", server.uri());
    notifier.send_embed(&destination, embed).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new();
    let destination = format!("{}/hook", server.uri());
    let result = notifier.send_embed(&destination, Embed::new("t", "d")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unreachable_destination_is_an_error() {
    let notifier = WebhookNotifier::new();
    let result = notifier
        .send_embed("http://127.0.0.1:1", Embed::new("t", "d"))
        .await;
    assert!(result.is_err());
}
