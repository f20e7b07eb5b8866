use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type BoxedDatabase = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn conflict_or_any(self, resource: &'static str, field: &'static str, value: &str)
        -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound { .. } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch and mutate wishlane data in a database.
///
/// Multi-row writes with consistency requirements are single operations here,
/// so an implementation can wrap them in one transaction: `create_friendship`
/// writes both directed rows, and `create_community` inserts the owner's
/// admin membership along with the community row.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_email(&self, email: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;
    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()>;

    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn clear_expired_sessions(&self) -> Result<()>;

    /// Inserts the edge in both directions, atomically. Inserting an edge
    /// that already exists is a no-op.
    async fn create_friendship(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<()>;
    /// Removes both directions of the edge, atomically. Removing an absent
    /// edge is a no-op.
    async fn delete_friendship(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<()>;
    async fn friend_ids_of(&self, user_id: PrimaryKey) -> Result<Vec<PrimaryKey>>;
    async fn are_friends(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<bool>;

    async fn create_wish(&self, new_wish: NewWish) -> Result<WishData>;
    async fn wish_by_id(&self, wish_id: PrimaryKey) -> Result<WishData>;
    async fn count_wishes_by_owner(&self, owner_id: PrimaryKey) -> Result<i64>;

    async fn create_notification(&self, new_notification: NewNotification)
        -> Result<NotificationData>;
    async fn notification_by_id(&self, notification_id: PrimaryKey) -> Result<NotificationData>;
    /// Notifications addressed to the recipient, newest first.
    async fn list_notifications(
        &self,
        recipient_id: PrimaryKey,
        read_filter: Option<bool>,
        limit: i64,
    ) -> Result<Vec<NotificationData>>;
    async fn mark_notification_read(&self, notification_id: PrimaryKey) -> Result<()>;
    /// Sets the terminal status and marks the notification read.
    async fn resolve_notification(
        &self,
        notification_id: PrimaryKey,
        status: NotificationStatus,
    ) -> Result<NotificationData>;

    /// Creates the community and its owner's admin membership, atomically.
    async fn create_community(&self, new_community: NewCommunity) -> Result<CommunityData>;
    async fn community_by_id(&self, community_id: PrimaryKey) -> Result<CommunityData>;
    async fn update_community(&self, updated_community: UpdatedCommunity)
        -> Result<CommunityData>;
    async fn delete_community(&self, community_id: PrimaryKey) -> Result<()>;

    async fn create_community_member(
        &self,
        new_member: NewCommunityMember,
    ) -> Result<CommunityMemberData>;
    async fn community_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<CommunityMemberData>;
    async fn list_community_members(
        &self,
        community_id: PrimaryKey,
    ) -> Result<Vec<CommunityMemberData>>;
    async fn delete_community_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<()>;

    async fn create_like(&self, new_like: NewLike) -> Result<LikeData>;
    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData>;
    async fn create_activity(&self, new_activity: NewActivity) -> Result<ActivityData>;
}

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub is_guest: bool,
    pub is_influencer: bool,
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub user_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewWish {
    pub owner_id: PrimaryKey,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub goal: f64,
    pub community_id: Option<PrimaryKey>,
    pub is_public: bool,
}

#[derive(Debug)]
pub struct NewNotification {
    pub recipient_id: PrimaryKey,
    pub sender_id: Option<PrimaryKey>,
    pub community_id: Option<PrimaryKey>,
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug)]
pub struct NewCommunity {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub rules: Option<String>,
    /// The creator, inserted as an admin member
    pub owner_id: PrimaryKey,
}

#[derive(Debug)]
pub struct UpdatedCommunity {
    pub id: PrimaryKey,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub rules: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug)]
pub struct NewCommunityMember {
    pub community_id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub role: CommunityRole,
}

#[derive(Debug)]
pub struct NewLike {
    pub user_id: PrimaryKey,
    pub wish_id: PrimaryKey,
}

#[derive(Debug)]
pub struct NewComment {
    pub user_id: PrimaryKey,
    pub wish_id: PrimaryKey,
    pub content: String,
}

#[derive(Debug)]
pub struct NewActivity {
    pub user_id: PrimaryKey,
    pub kind: ActivityKind,
    pub target_type: Option<String>,
    pub target_id: Option<PrimaryKey>,
}
