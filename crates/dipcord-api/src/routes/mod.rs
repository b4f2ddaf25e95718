//! Route definitions
//!
//! All API routes organized by resource and mounted under /v1.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{auth, channels, health, invites, members, messages, polls, tasks, users};
use crate::state::AppState;

/// API router, without health routes so they can skip the rate limiter
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(channel_routes())
        .merge(invite_routes())
        .merge(message_routes())
        .merge(task_routes())
        .merge(poll_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/@me",
            get(users::get_current_user).patch(users::update_current_user),
        )
        .route("/users/@me/channels", get(users::get_my_channels))
        .route("/users/:user_id", get(users::get_user))
}

fn channel_routes() -> Router<AppState> {
    Router::new()
        .route("/channels", post(channels::create_channel))
        .route("/channels/discover", get(channels::discover_channels))
        .route(
            "/channels/:channel_id",
            get(channels::get_channel)
                .patch(channels::update_channel)
                .delete(channels::delete_channel),
        )
        .route("/channels/:channel_id/join", post(channels::join_channel))
        .route("/channels/:channel_id/transfer", post(channels::transfer_ownership))
        .route(
            "/channels/:channel_id/typing",
            post(channels::start_typing).delete(channels::stop_typing),
        )
        // Members
        .route(
            "/channels/:channel_id/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/channels/:channel_id/members/@me",
            delete(members::leave_channel),
        )
        .route(
            "/channels/:channel_id/members/:user_id",
            get(members::get_member)
                .patch(members::update_member)
                .delete(members::remove_member),
        )
        // Channel-scoped collections
        .route(
            "/channels/:channel_id/invites",
            get(invites::list_channel_invites).post(invites::create_invite),
        )
        .route(
            "/channels/:channel_id/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/channels/:channel_id/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            "/channels/:channel_id/polls",
            get(polls::list_polls).post(polls::create_poll),
        )
}

fn invite_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/invites/:code",
            get(invites::get_invite).delete(invites::revoke_invite),
        )
        .route("/invites/:code/accept", post(invites::accept_invite))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages/:message_id",
            get(messages::get_message)
                .patch(messages::edit_message)
                .delete(messages::delete_message),
        )
        .route("/messages/:message_id/replies", get(messages::list_replies))
        .route(
            "/messages/:message_id/reactions",
            get(messages::list_reactions).post(messages::toggle_reaction),
        )
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks/:task_id",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/:task_id/status", put(tasks::update_task_status))
}

fn poll_routes() -> Router<AppState> {
    Router::new()
        .route("/polls/:poll_id", get(polls::get_poll))
        .route(
            "/polls/:poll_id/votes",
            put(polls::vote).delete(polls::retract_vote),
        )
        .route("/polls/:poll_id/close", post(polls::close_poll))
}
