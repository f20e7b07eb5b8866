//! All schemas that are exposed from endpoints are defined here
//! along with the [ToSerialized] impls

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use wishlane_social::{
    CommentData, CommunityData, CommunityMemberData, FriendView, LikeData, NotificationData,
    SessionData, UserData, WishData,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: i32,
    email: String,
    name: Option<String>,
    display_name: String,
    avatar_url: Option<String>,
    description: Option<String>,
    privacy: String,
    is_guest: bool,
    is_influencer: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    user: User,
    mutual_friends: i64,
    wishlists_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    id: i32,
    kind: String,
    message: String,
    status: String,
    is_read: bool,
    sender_id: Option<i32>,
    sender_avatar_url: Option<String>,
    community_id: Option<i32>,
    created_at: DateTime<Utc>,
}

/// A human-readable result for actions without a richer response body
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    id: i32,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    category: Option<String>,
    rules: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMember {
    id: i32,
    name: String,
    avatar_url: Option<String>,
    role: String,
    is_online: bool,
    contributions: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
    id: i32,
    owner_id: i32,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    goal: f64,
    raised: f64,
    community_id: Option<i32>,
    is_public: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    id: i32,
    user_id: i32,
    wish_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    id: i32,
    user_id: i32,
    wish_id: i32,
    content: String,
    created_at: DateTime<Utc>,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            display_name: self.display_name().to_string(),
            avatar_url: self.avatar_url.clone(),
            description: self.description.clone(),
            privacy: self.privacy.as_str().to_string(),
            is_guest: self.is_guest,
            is_influencer: self.is_influencer,
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Friend> for FriendView {
    fn to_serialized(&self) -> Friend {
        Friend {
            user: self.user.to_serialized(),
            mutual_friends: self.mutual_friends as i64,
            wishlists_count: self.wish_count,
        }
    }
}

impl ToSerialized<Notification> for NotificationData {
    fn to_serialized(&self) -> Notification {
        Notification {
            id: self.id,
            kind: self.kind.as_str().to_string(),
            message: self.message.clone(),
            status: self.status.as_str().to_string(),
            is_read: self.is_read,
            sender_id: self.sender_id,
            sender_avatar_url: self.sender_avatar_url.clone(),
            community_id: self.community_id,
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Community> for CommunityData {
    fn to_serialized(&self) -> Community {
        Community {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            rules: self.rules.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<CommunityMember> for CommunityMemberData {
    fn to_serialized(&self) -> CommunityMember {
        CommunityMember {
            id: self.user.id,
            name: self.user.display_name().to_string(),
            avatar_url: self.user.avatar_url.clone(),
            role: self.role.as_str().to_string(),
            is_online: self.is_online,
            contributions: self.contributions,
        }
    }
}

impl ToSerialized<Wish> for WishData {
    fn to_serialized(&self) -> Wish {
        Wish {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            goal: self.goal,
            raised: self.raised,
            community_id: self.community_id,
            is_public: self.is_public,
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Like> for LikeData {
    fn to_serialized(&self) -> Like {
        Like {
            id: self.id,
            user_id: self.user_id,
            wish_id: self.wish_id,
        }
    }
}

impl ToSerialized<Comment> for CommentData {
    fn to_serialized(&self) -> Comment {
        Comment {
            id: self.id,
            user_id: self.user_id,
            wish_id: self.wish_id,
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}
