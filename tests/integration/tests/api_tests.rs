//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p dipcord-integration-tests --test api_tests

use dipcord_integration_tests::{
    assert_json, assert_status, check_test_env, error_code, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

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

async fn post_message(server: &TestServer, token: &str, channel_id: &str, request: &CreateMessageRequest) -> MessageResponse {
    let response = server
        .post_auth(&format!("/channels/{channel_id}/messages"), token, request)
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    let response = server.post("/auth/register", &request).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(auth.user.email, request.email);
    assert_eq!(auth.user.surname, request.surname);
    assert_eq!(auth.token_type, "Bearer");
    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    server.post("/auth/register", &request).await.unwrap();

    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let mut request = RegisterRequest::unique();
    request.password = "short".to_string();

    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_login() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let register_req = RegisterRequest::unique();
    server.post("/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/auth/login", &login_req).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(auth.user.email, register_req.email);
    assert!(!auth.access_token.is_empty());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let login_req = LoginRequest {
        email: "nonexistent@example.com".to_string(),
        password: "wrongpass".to_string(),
    };

    let response = server.post("/auth/login", &login_req).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token_rotates() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;

    let refresh_req = RefreshTokenRequest {
        refresh_token: auth.refresh_token.clone(),
    };
    let response = server.post("/auth/refresh", &refresh_req).await.unwrap();
    let tokens: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!tokens.access_token.is_empty());

    // The old refresh token was consumed
    let response = server.post("/auth/refresh", &refresh_req).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;

    let response = server
        .post_auth("/auth/logout", &auth.access_token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_get_current_user() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;

    let response = server.get_auth("/users/@me", &auth.access_token).await.unwrap();
    let user: CurrentUserResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(user.id, auth.user.id);
    assert_eq!(user.email, auth.user.email);
}

#[tokio::test]
async fn test_get_current_user_unauthorized() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/users/@me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Channel Tests
// ============================================================================

#[tokio::test]
async fn test_create_channel_makes_creator_owner() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;
    let channel = create_channel(&server, &auth.access_token, &CreateChannelRequest::private()).await;

    assert_eq!(channel.created_by, auth.user.id);

    let response = server
        .get_auth(
            &format!("/channels/{}/members/{}", channel.id, auth.user.id),
            &auth.access_token,
        )
        .await
        .unwrap();
    let member: MemberResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(member.role, "owner");

    let response = server
        .get_auth("/users/@me/channels", &auth.access_token)
        .await
        .unwrap();
    let channels: Vec<ChannelResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(channels.iter().any(|c| c.id == channel.id));
}

#[tokio::test]
async fn test_private_channel_hidden_from_outsiders() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = register(&server).await;
    let outsider = register(&server).await;
    let channel = create_channel(&server, &owner.access_token, &CreateChannelRequest::private()).await;

    let response = server
        .get_auth(&format!("/channels/{}", channel.id), &outsider.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth(
            &format!("/channels/{}/messages", channel.id),
            &outsider.access_token,
            &CreateMessageRequest::simple("let me in"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_join_public_channel() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = register(&server).await;
    let joiner = register(&server).await;
    let channel = create_channel(&server, &owner.access_token, &CreateChannelRequest::public()).await;

    let response = server
        .post_auth(
            &format!("/channels/{}/join", channel.id),
            &joiner.access_token,
            &json!({}),
        )
        .await
        .unwrap();
    let member: MemberResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(member.user_id, joiner.user.id);
    assert_eq!(member.role, "user");

    let response = server
        .get_auth(&format!("/channels/{}/members", channel.id), &joiner.access_token)
        .await
        .unwrap();
    let members: Vec<MemberResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_malformed_channel_id() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;

    let response = server
        .get_auth("/channels/not-a-number", &auth.access_token)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await.unwrap(), "INVALID_PATH_PARAMETER");
}

// ============================================================================
// Invite Tests
// ============================================================================

#[tokio::test]
async fn test_invite_is_single_use() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = register(&server).await;
    let guest = register(&server).await;
    let latecomer = register(&server).await;
    let channel = create_channel(&server, &owner.access_token, &CreateChannelRequest::private()).await;

    let response = server
        .post_auth(
            &format!("/channels/{}/invites", channel.id),
            &owner.access_token,
            &json!({}),
        )
        .await
        .unwrap();
    let invite: InviteResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(invite.channel_id, channel.id);
    assert!(!invite.is_used);

    let response = server
        .post_auth(
            &format!("/invites/{}/accept", invite.code),
            &guest.access_token,
            &json!({}),
        )
        .await
        .unwrap();
    let joined: ChannelResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(joined.id, channel.id);

    let response = server
        .post_auth(
            &format!("/invites/{}/accept", invite.code),
            &latecomer.access_token,
            &json!({}),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = server
        .get_auth(&format!("/channels/{}", channel.id), &guest.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_message_thread_and_reactions() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;
    let token = auth.access_token.as_str();
    let channel = create_channel(&server, token, &CreateChannelRequest::public()).await;

    let root = post_message(&server, token, &channel.id, &CreateMessageRequest::simple("root")).await;
    assert_eq!(root.content.as_deref(), Some("root"));
    assert_eq!(root.user_id, auth.user.id);

    let reply = post_message(&server, token, &channel.id, &CreateMessageRequest::reply("reply", &root.id)).await;
    assert_eq!(reply.parent_message_id.as_deref(), Some(root.id.as_str()));

    let response = server
        .get_auth(&format!("/messages/{}/replies", root.id), token)
        .await
        .unwrap();
    let replies: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].id, reply.id);

    let response = server
        .get_auth(&format!("/messages/{}", root.id), token)
        .await
        .unwrap();
    let fetched: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.reply_count, 1);

    let path = format!("/messages/{}/reactions", root.id);
    let response = server
        .post_auth(&path, token, &json!({"emoji": "👍"}))
        .await
        .unwrap();
    let toggled: ReactionToggleResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(toggled.action, "add");
    assert_eq!(toggled.count, 1);

    let response = server
        .post_auth(&path, token, &json!({"emoji": "👍"}))
        .await
        .unwrap();
    let toggled: ReactionToggleResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(toggled.action, "remove");
    assert_eq!(toggled.count, 0);
}

#[tokio::test]
async fn test_edit_and_delete_message() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;
    let token = auth.access_token.as_str();
    let channel = create_channel(&server, token, &CreateChannelRequest::public()).await;
    let message = post_message(&server, token, &channel.id, &CreateMessageRequest::simple("first")).await;

    let response = server
        .patch_auth(&format!("/messages/{}", message.id), token, &json!({"content": "second"}))
        .await
        .unwrap();
    let edited: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(edited.content.as_deref(), Some("second"));
    assert!(edited.is_edited);

    let response = server
        .delete_auth(&format!("/messages/{}", message.id), token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth(&format!("/messages/{}", message.id), token)
        .await
        .unwrap();
    let deleted: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(deleted.is_deleted);
    assert!(deleted.content.is_none());
}

// ============================================================================
// Task and Poll Tests
// ============================================================================

#[tokio::test]
async fn test_task_moves_between_columns() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;
    let token = auth.access_token.as_str();
    let channel = create_channel(&server, token, &CreateChannelRequest::public()).await;

    let response = server
        .post_auth(
            &format!("/channels/{}/tasks", channel.id),
            token,
            &json!({"title": "Write the release notes", "assignee_id": auth.user.id}),
        )
        .await
        .unwrap();
    let task: TaskResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(task.status, "todo");
    assert_eq!(task.assignee_id.as_deref(), Some(auth.user.id.as_str()));

    let response = server
        .put_auth(
            &format!("/tasks/{}/status", task.id),
            token,
            &json!({"status": "in_progress"}),
        )
        .await
        .unwrap();
    let moved: TaskResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(moved.status, "in_progress");

    let response = server
        .get_auth(&format!("/channels/{}/tasks?status=in_progress", channel.id), token)
        .await
        .unwrap();
    let tasks: Vec<TaskResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
}

#[tokio::test]
async fn test_poll_vote_and_close() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = register(&server).await;
    let token = auth.access_token.as_str();
    let channel = create_channel(&server, token, &CreateChannelRequest::public()).await;

    let response = server
        .post_auth(
            &format!("/channels/{}/polls", channel.id),
            token,
            &json!({"question": "Lunch?", "options": ["Pizza", "Sushi"]}),
        )
        .await
        .unwrap();
    let poll: PollResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(poll.options.len(), 2);
    assert!(!poll.is_closed);

    let choice = poll.options[1].id.clone();
    let response = server
        .put_auth(
            &format!("/polls/{}/votes", poll.id),
            token,
            &json!({"option_ids": [choice]}),
        )
        .await
        .unwrap();
    let voted: PollResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(voted.my_votes, vec![choice.clone()]);
    assert_eq!(voted.total_voters, 1);

    let response = server
        .post_auth(&format!("/polls/{}/close", poll.id), token, &json!({}))
        .await
        .unwrap();
    let closed: PollResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(closed.is_closed);

    let response = server
        .put_auth(
            &format!("/polls/{}/votes", poll.id),
            token,
            &json!({"option_ids": [choice]}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}
