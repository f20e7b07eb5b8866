use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json,
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    serialized::{Detail, Friend, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/friends",
    tag = "friends",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Friend>)
    )
)]
pub(crate) async fn list_friends(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Friend>>> {
    let friends = context
        .social
        .friends
        .list_friends(session.user().id)
        .await?;

    Ok(Json(friends.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/friends/{id}",
    tag = "friends",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Detail, description = "User was added as a friend")
    )
)]
pub(crate) async fn add_friend(
    session: Session,
    State(context): State<ServerContext>,
    Path(user_id): Path<i32>,
) -> ServerResult<(StatusCode, Json<Detail>)> {
    context
        .social
        .friends
        .add_friend(&session.user(), user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(Detail::new("Friend added"))))
}

#[utoipa::path(
    delete,
    path = "/v1/friends/{id}",
    tag = "friends",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 204, description = "Friendship was removed in both directions")
    )
)]
pub(crate) async fn remove_friend(
    session: Session,
    State(context): State<ServerContext>,
    Path(user_id): Path<i32>,
) -> ServerResult<StatusCode> {
    context
        .social
        .friends
        .remove_friend(&session.user(), user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_friends))
        .route("/:id", post(add_friend))
        .route("/:id", delete(remove_friend))
}
