use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json,
};
use wishlane_social::{NewCommunityOptions, UpdatedCommunity};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewCommunitySchema, UpdateCommunitySchema, ValidatedJson},
    serialized::{Community, CommunityMember, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/communities",
    tag = "communities",
    request_body = NewCommunitySchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = Community)
    )
)]
pub(crate) async fn create_community(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewCommunitySchema>,
) -> ServerResult<(StatusCode, Json<Community>)> {
    let community = context
        .social
        .communities
        .create_community(
            &session.user(),
            NewCommunityOptions {
                name: body.name,
                description: body.description,
                image_url: body.image_url,
                category: body.category,
                rules: body.rules,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(community.to_serialized())))
}

#[utoipa::path(
    get,
    path = "/v1/communities/{id}",
    tag = "communities",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Community)
    )
)]
pub(crate) async fn community(
    _session: Session,
    State(context): State<ServerContext>,
    Path(community_id): Path<i32>,
) -> ServerResult<Json<Community>> {
    let community = context.social.communities.community(community_id).await?;

    Ok(Json(community.to_serialized()))
}

#[utoipa::path(
    patch,
    path = "/v1/communities/{id}",
    tag = "communities",
    request_body = UpdateCommunitySchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Community)
    )
)]
pub(crate) async fn update_community(
    session: Session,
    State(context): State<ServerContext>,
    Path(community_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateCommunitySchema>,
) -> ServerResult<Json<Community>> {
    let community = context
        .social
        .communities
        .update_community(
            &session.user(),
            UpdatedCommunity {
                id: community_id,
                name: body.name,
                description: body.description,
                image_url: body.image_url,
                category: body.category,
                rules: body.rules,
                is_active: body.is_active,
            },
        )
        .await?;

    Ok(Json(community.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/communities/{id}",
    tag = "communities",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 204, description = "Community was deleted")
    )
)]
pub(crate) async fn delete_community(
    session: Session,
    State(context): State<ServerContext>,
    Path(community_id): Path<i32>,
) -> ServerResult<StatusCode> {
    context
        .social
        .communities
        .delete_community(&session.user(), community_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/communities/{id}/members",
    tag = "communities",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<CommunityMember>),
        (status = 403, description = "Guests may not view member lists")
    )
)]
pub(crate) async fn list_members(
    session: Session,
    State(context): State<ServerContext>,
    Path(community_id): Path<i32>,
) -> ServerResult<Json<Vec<CommunityMember>>> {
    let members = context
        .social
        .communities
        .list_members(&session.user(), community_id)
        .await?;

    Ok(Json(members.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/communities/{id}/members",
    tag = "communities",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 201, body = CommunityMember),
        (status = 409, description = "User is already a member")
    )
)]
pub(crate) async fn join(
    session: Session,
    State(context): State<ServerContext>,
    Path(community_id): Path<i32>,
) -> ServerResult<(StatusCode, Json<CommunityMember>)> {
    let member = context
        .social
        .communities
        .join(&session.user(), community_id)
        .await?;

    Ok((StatusCode::CREATED, Json(member.to_serialized())))
}

#[utoipa::path(
    delete,
    path = "/v1/communities/{id}/members/{user_id}",
    tag = "communities",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 204, description = "Member was removed from the community")
    )
)]
pub(crate) async fn remove_member(
    session: Session,
    State(context): State<ServerContext>,
    Path((community_id, user_id)): Path<(i32, i32)>,
) -> ServerResult<StatusCode> {
    context
        .social
        .communities
        .remove_member(&session.user(), community_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_community))
        .route("/:id", get(community))
        .route("/:id", patch(update_community))
        .route("/:id", delete(delete_community))
        .route("/:id/members", get(list_members))
        .route("/:id/members", post(join))
        .route("/:id/members/:user_id", delete(remove_member))
}
