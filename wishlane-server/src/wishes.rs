use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json,
};
use wishlane_social::NewWishOptions;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewCommentSchema, NewWishSchema, ValidatedJson},
    serialized::{Comment, Like, ToSerialized, Wish},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/wishes",
    tag = "wishes",
    request_body = NewWishSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Wish)
    )
)]
pub(crate) async fn create_wish(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewWishSchema>,
) -> ServerResult<(StatusCode, Json<Wish>)> {
    let wish = context
        .social
        .engagement
        .create_wish(
            &session.user(),
            NewWishOptions {
                title: body.title,
                description: body.description,
                image_url: body.image_url,
                goal: body.goal,
                community_id: body.community_id,
                is_public: body.is_public,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(wish.to_serialized())))
}

#[utoipa::path(
    get,
    path = "/v1/wishes/{id}",
    tag = "wishes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Wish)
    )
)]
pub(crate) async fn wish(
    _session: Session,
    State(context): State<ServerContext>,
    Path(wish_id): Path<i32>,
) -> ServerResult<Json<Wish>> {
    let wish = context.social.engagement.wish(wish_id).await?;

    Ok(Json(wish.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/wishes/{id}/likes",
    tag = "wishes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Like),
        (status = 409, description = "Wish is already liked by this user")
    )
)]
pub(crate) async fn like_wish(
    session: Session,
    State(context): State<ServerContext>,
    Path(wish_id): Path<i32>,
) -> ServerResult<(StatusCode, Json<Like>)> {
    let like = context
        .social
        .engagement
        .like_wish(&session.user(), wish_id)
        .await?;

    Ok((StatusCode::CREATED, Json(like.to_serialized())))
}

#[utoipa::path(
    post,
    path = "/v1/wishes/{id}/comments",
    tag = "wishes",
    request_body = NewCommentSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Comment)
    )
)]
pub(crate) async fn comment_wish(
    session: Session,
    State(context): State<ServerContext>,
    Path(wish_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<NewCommentSchema>,
) -> ServerResult<(StatusCode, Json<Comment>)> {
    let comment = context
        .social
        .engagement
        .comment_wish(&session.user(), wish_id, body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.to_serialized())))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_wish))
        .route("/:id", get(wish))
        .route("/:id/likes", post(like_wish))
        .route("/:id/comments", post(comment_wish))
}
