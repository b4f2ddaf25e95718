//! Gateway Integration Tests
//!
//! The API publishes through Redis and the gateway forwards to sockets, so
//! these need the same services as the API tests.
//!
//! Run with: cargo test -p dipcord-integration-tests --test gateway_tests

use std::time::Duration;

use dipcord_integration_tests::{
    assert_json, check_test_env, fixtures::*, TestGateway, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

/// Time for the gateway's Redis SUBSCRIBE to land after it reacts to an event
const SUBSCRIBE_SETTLE: Duration = Duration::from_millis(200);

async fn register(server: &TestServer) -> AuthResponse {
    let response = server
        .post("/auth/register", &RegisterRequest::unique())
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn create_channel(server: &TestServer, token: &str, request: &CreateChannelRequest) -> ChannelResponse {
    let response = server.post_auth("/channels", token, request).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn post_message(server: &TestServer, token: &str, channel_id: &str, content: &str) -> MessageResponse {
    let response = server
        .post_auth(
            &format!("/channels/{channel_id}/messages"),
            token,
            &CreateMessageRequest::simple(content),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

#[tokio::test]
async fn test_ready_lists_memberships() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start API");
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let auth = register(&server).await;
    let channel = create_channel(&server, &auth.access_token, &CreateChannelRequest::private()).await;

    let (_client, ready) = gateway
        .identify(&format!("Bearer {}", auth.access_token))
        .await
        .unwrap();

    assert!(ready["session_id"].as_str().is_some_and(|s| !s.is_empty()));
    assert_eq!(ready["user"]["id"], auth.user.id.as_str());
    assert_eq!(ready["channel_ids"], json!([channel.id]));
}

#[tokio::test]
async fn test_heartbeat_after_identify() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start API");
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let auth = register(&server).await;

    let (mut client, _) = gateway.identify(&auth.access_token).await.unwrap();
    client.send(json!({"op": 1})).await.unwrap();

    let ack = client.next_frame().await.unwrap();
    assert_eq!(ack["op"], 11);
}

#[tokio::test]
async fn test_message_created_reaches_members() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start API");
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let owner = register(&server).await;
    let channel = create_channel(&server, &owner.access_token, &CreateChannelRequest::public()).await;

    let (mut client, _) = gateway.identify(&owner.access_token).await.unwrap();
    tokio::time::sleep(SUBSCRIBE_SETTLE).await;

    let message = post_message(&server, &owner.access_token, &channel.id, "hello gateway").await;

    let data = client.next_dispatch("message:created").await.unwrap();
    assert_eq!(data["channel_id"], channel.id.as_str());
    assert_eq!(data["message_id"], message.id.as_str());
}

#[tokio::test]
async fn test_joining_over_rest_subscribes_live_socket() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start API");
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let owner = register(&server).await;
    let joiner = register(&server).await;
    let channel = create_channel(&server, &owner.access_token, &CreateChannelRequest::public()).await;

    let (mut client, ready) = gateway.identify(&joiner.access_token).await.unwrap();
    assert_eq!(ready["channel_ids"], json!([]));
    tokio::time::sleep(SUBSCRIBE_SETTLE).await;

    let response = server
        .post_auth(
            &format!("/channels/{}/join", channel.id),
            &joiner.access_token,
            &json!({}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let joined = client.next_dispatch("channel:joined").await.unwrap();
    assert_eq!(joined["channel_id"], channel.id.as_str());
    tokio::time::sleep(SUBSCRIBE_SETTLE).await;

    let message = post_message(&server, &owner.access_token, &channel.id, "welcome").await;
    let data = client.next_dispatch("message:created").await.unwrap();
    assert_eq!(data["message_id"], message.id.as_str());
}

#[tokio::test]
async fn test_typing_over_gateway_reaches_other_members() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start API");
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let owner = register(&server).await;
    let typist = register(&server).await;
    let channel = create_channel(&server, &owner.access_token, &CreateChannelRequest::public()).await;

    let response = server
        .post_auth(
            &format!("/channels/{}/join", channel.id),
            &typist.access_token,
            &json!({}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (mut watcher, _) = gateway.identify(&owner.access_token).await.unwrap();
    let (mut sender, _) = gateway.identify(&typist.access_token).await.unwrap();
    tokio::time::sleep(SUBSCRIBE_SETTLE).await;

    sender
        .send(json!({"op": 5, "d": {"channel_id": channel.id}}))
        .await
        .unwrap();

    let data = watcher.next_dispatch("typing:start").await.unwrap();
    assert_eq!(data["channel_id"], channel.id.as_str());
    assert_eq!(data["user_id"], typist.user.id.as_str());
}

#[tokio::test]
async fn test_sequence_numbers_increase() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start API");
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let owner = register(&server).await;
    let channel = create_channel(&server, &owner.access_token, &CreateChannelRequest::public()).await;

    let (mut client, _) = gateway.identify(&owner.access_token).await.unwrap();
    tokio::time::sleep(SUBSCRIBE_SETTLE).await;

    post_message(&server, &owner.access_token, &channel.id, "one").await;
    post_message(&server, &owner.access_token, &channel.id, "two").await;

    let mut sequences = Vec::new();
    while sequences.len() < 2 {
        let frame = client.next_frame().await.unwrap();
        if frame["t"] == "message:created" {
            sequences.push(frame["s"].as_u64().unwrap());
        }
    }
    assert!(sequences[1] > sequences[0]);
}
