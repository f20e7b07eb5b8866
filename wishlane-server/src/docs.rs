use std::borrow::BorrowMut;

use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{auth, communities, friends, notifications, schemas, serialized, wishes};

#[derive(OpenApi)]
#[openapi(
    modifiers(&Security),
    info(
        description = "wishlane-server exposes endpoints to interact with this wishlane instance"
    ),
    paths(
        auth::login,
        auth::register,
        auth::guest,
        auth::logout,
        auth::user,
        friends::list_friends,
        friends::add_friend,
        friends::remove_friend,
        notifications::list_notifications,
        notifications::create_notification,
        notifications::send_friend_request,
        notifications::send_join_request,
        notifications::mark_read,
        notifications::accept_friend_request,
        notifications::reject_friend_request,
        notifications::accept_join_request,
        notifications::reject_join_request,
        notifications::dismiss,
        communities::create_community,
        communities::community,
        communities::update_community,
        communities::delete_community,
        communities::list_members,
        communities::join,
        communities::remove_member,
        wishes::create_wish,
        wishes::wish,
        wishes::like_wish,
        wishes::comment_wish,
    ),
    components(schemas(
        schemas::LoginSchema,
        schemas::RegisterSchema,
        schemas::NewNotificationSchema,
        schemas::NewFriendRequestSchema,
        schemas::NewJoinRequestSchema,
        schemas::NewCommunitySchema,
        schemas::UpdateCommunitySchema,
        schemas::NewWishSchema,
        schemas::NewCommentSchema,
        serialized::User,
        serialized::LoginResult,
        serialized::Friend,
        serialized::Notification,
        serialized::Detail,
        serialized::Community,
        serialized::CommunityMember,
        serialized::Wish,
        serialized::Like,
        serialized::Comment,
    ))
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.borrow_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("Bearer <token>")
                .build();

            components.add_security_scheme("BearerAuth", SecurityScheme::Http(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
