use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json,
};
use wishlane_social::AcceptOutcome;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{
        NewFriendRequestSchema, NewJoinRequestSchema, NewNotificationSchema, NotificationQuery,
        ValidatedJson, DEFAULT_NOTIFICATION_LIMIT,
    },
    serialized::{Detail, Notification, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/notifications",
    tag = "notifications",
    params(NotificationQuery),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Notification>)
    )
)]
pub(crate) async fn list_notifications(
    session: Session,
    State(context): State<ServerContext>,
    Query(query): Query<NotificationQuery>,
) -> ServerResult<Json<Vec<Notification>>> {
    let notifications = context
        .social
        .notifications
        .list(
            &session.user(),
            query.read_filter,
            query.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT),
        )
        .await?;

    Ok(Json(notifications.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/notifications",
    tag = "notifications",
    request_body = NewNotificationSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Notification)
    )
)]
pub(crate) async fn create_notification(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewNotificationSchema>,
) -> ServerResult<(StatusCode, Json<Notification>)> {
    let notification = context
        .social
        .notifications
        .send_message(&session.user(), body.recipient_id, body.message)
        .await?;

    Ok((StatusCode::CREATED, Json(notification.to_serialized())))
}

#[utoipa::path(
    post,
    path = "/v1/notifications/friend-requests",
    tag = "notifications",
    request_body = NewFriendRequestSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Notification)
    )
)]
pub(crate) async fn send_friend_request(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewFriendRequestSchema>,
) -> ServerResult<(StatusCode, Json<Notification>)> {
    let notification = context
        .social
        .notifications
        .send_friend_request(&session.user(), body.recipient_id, body.message)
        .await?;

    Ok((StatusCode::CREATED, Json(notification.to_serialized())))
}

#[utoipa::path(
    post,
    path = "/v1/notifications/join-requests",
    tag = "notifications",
    request_body = NewJoinRequestSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Vec<Notification>, description = "One join request was sent to each community admin")
    )
)]
pub(crate) async fn send_join_request(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewJoinRequestSchema>,
) -> ServerResult<(StatusCode, Json<Vec<Notification>>)> {
    let notifications = context
        .social
        .notifications
        .send_join_request(&session.user(), body.community_id)
        .await?;

    Ok((StatusCode::CREATED, Json(notifications.to_serialized())))
}

#[utoipa::path(
    put,
    path = "/v1/notifications/{id}/read",
    tag = "notifications",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 204, description = "Notification was marked as read")
    )
)]
pub(crate) async fn mark_read(
    session: Session,
    State(context): State<ServerContext>,
    Path(notification_id): Path<i32>,
) -> ServerResult<StatusCode> {
    context
        .social
        .notifications
        .mark_read(&session.user(), notification_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/friend-request/accept",
    tag = "notifications",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Detail)
    )
)]
pub(crate) async fn accept_friend_request(
    session: Session,
    State(context): State<ServerContext>,
    Path(notification_id): Path<i32>,
) -> ServerResult<Json<Detail>> {
    let outcome = context
        .social
        .notifications
        .accept_friend_request(&session.user(), notification_id)
        .await?;

    Ok(Json(outcome.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/friend-request/reject",
    tag = "notifications",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Detail)
    )
)]
pub(crate) async fn reject_friend_request(
    session: Session,
    State(context): State<ServerContext>,
    Path(notification_id): Path<i32>,
) -> ServerResult<Json<Detail>> {
    context
        .social
        .notifications
        .reject_friend_request(&session.user(), notification_id)
        .await?;

    Ok(Json(Detail::new("Friend request rejected")))
}

#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/join-request/accept",
    tag = "notifications",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Detail)
    )
)]
pub(crate) async fn accept_join_request(
    session: Session,
    State(context): State<ServerContext>,
    Path(notification_id): Path<i32>,
) -> ServerResult<Json<Detail>> {
    let outcome = context
        .social
        .notifications
        .accept_join_request(&session.user(), notification_id)
        .await?;

    Ok(Json(outcome.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/join-request/reject",
    tag = "notifications",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Detail)
    )
)]
pub(crate) async fn reject_join_request(
    session: Session,
    State(context): State<ServerContext>,
    Path(notification_id): Path<i32>,
) -> ServerResult<Json<Detail>> {
    context
        .social
        .notifications
        .reject_join_request(&session.user(), notification_id)
        .await?;

    Ok(Json(Detail::new("Join request rejected")))
}

#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/dismiss",
    tag = "notifications",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Notification)
    )
)]
pub(crate) async fn dismiss(
    session: Session,
    State(context): State<ServerContext>,
    Path(notification_id): Path<i32>,
) -> ServerResult<Json<Notification>> {
    let notification = context
        .social
        .notifications
        .dismiss(&session.user(), notification_id)
        .await?;

    Ok(Json(notification.to_serialized()))
}

// Kept here so the outcome wording stays next to the endpoints that use it
impl ToSerialized<Detail> for AcceptOutcome {
    fn to_serialized(&self) -> Detail {
        let detail = match self {
            AcceptOutcome::FriendAdded => "Friend request accepted",
            AcceptOutcome::AlreadyFriends => "Friend request accepted, already friends",
            AcceptOutcome::MemberAdded => "Join request accepted",
            AcceptOutcome::AlreadyMember => "Join request accepted, already a member",
        };

        Detail::new(detail)
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/", post(create_notification))
        .route("/friend-requests", post(send_friend_request))
        .route("/join-requests", post(send_join_request))
        .route("/:id/read", put(mark_read))
        .route("/:id/friend-request/accept", post(accept_friend_request))
        .route("/:id/friend-request/reject", post(reject_friend_request))
        .route("/:id/join-request/accept", post(accept_join_request))
        .route("/:id/join-request/reject", post(reject_join_request))
        .route("/:id/dismiss", post(dismiss))
}
