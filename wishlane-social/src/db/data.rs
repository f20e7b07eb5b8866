use chrono::{DateTime, Utc};
use serde::Serialize;

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// Who may see a user's profile and wishlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    Public,
    Friends,
    Private,
    Anonymous,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Friends => "friends",
            Self::Private => "private",
            Self::Anonymous => "anonymous",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "friends" => Some(Self::Friends),
            "private" => Some(Self::Private),
            "anonymous" => Some(Self::Anonymous),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FriendRequest,
    Message,
    JoinRequest,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FriendRequest => "friend_request",
            Self::Message => "message",
            Self::JoinRequest => "join_request",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "friend_request" => Some(Self::FriendRequest),
            "message" => Some(Self::Message),
            "join_request" => Some(Self::JoinRequest),
            _ => None,
        }
    }
}

/// Resolution state of a notification.
///
/// `is_read` is tracked separately, since reading a notification does not
/// resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Accepted,
    Rejected,
    Dismissed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }

    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityRole {
    Admin,
    Moderator,
    Member,
}

impl CommunityRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Member => "member",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "moderator" => Some(Self::Moderator),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CreateWish,
    Comment,
    Like,
    Follow,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateWish => "create_wish",
            Self::Comment => "comment",
            Self::Like => "like",
            Self::Follow => "follow",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create_wish" => Some(Self::CreateWish),
            "comment" => Some(Self::Comment),
            "like" => Some(Self::Like),
            "follow" => Some(Self::Follow),
            _ => None,
        }
    }
}

/// A wishlane account
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: PrimaryKey,
    pub email: String,
    /// The argon2 hash, never the plain text
    pub password: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    pub privacy: Privacy,
    /// Guests may browse but not mutate social state
    pub is_guest: bool,
    pub is_influencer: bool,
    pub created_at: DateTime<Utc>,
}

impl UserData {
    /// The name shown to other users, falling back to the email.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Login session data for authentication
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    /// The session token, or key if you will
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The user that is logged in
    pub user: UserData,
}

/// A funding goal published by a user
#[derive(Debug, Clone)]
pub struct WishData {
    pub id: PrimaryKey,
    pub owner_id: PrimaryKey,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub goal: f64,
    pub raised: f64,
    /// Set when the wish is scoped to a community
    pub community_id: Option<PrimaryKey>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NotificationData {
    pub id: PrimaryKey,
    pub recipient_id: PrimaryKey,
    pub sender_id: Option<PrimaryKey>,
    pub community_id: Option<PrimaryKey>,
    pub kind: NotificationKind,
    pub message: String,
    pub status: NotificationStatus,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    /// Denormalized from the sender for list views
    pub sender_avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommunityData {
    pub id: PrimaryKey,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub rules: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A member of a community
#[derive(Debug, Clone)]
pub struct CommunityMemberData {
    pub id: PrimaryKey,
    pub community_id: PrimaryKey,
    pub role: CommunityRole,
    pub is_online: bool,
    pub contributions: i32,
    pub joined_at: DateTime<Utc>,
    pub user: UserData,
}

#[derive(Debug, Clone)]
pub struct LikeData {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub wish_id: PrimaryKey,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CommentData {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub wish_id: PrimaryKey,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A row in the activity feed
#[derive(Debug, Clone)]
pub struct ActivityData {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub kind: ActivityKind,
    pub target_type: Option<String>,
    pub target_id: Option<PrimaryKey>,
    pub created_at: DateTime<Utc>,
}
