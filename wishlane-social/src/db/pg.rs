use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    migrate::{MigrateError, Migrator},
    postgres::PgPoolOptions,
    query, query_as, query_scalar, Error as SqlxError, FromRow, PgPool,
};

use crate::db::{
    ActivityData, CommentData, CommunityData, CommunityMemberData, CommunityRole, Database,
    DatabaseError, DatabaseResult, IntoDatabaseError, LikeData, NewActivity, NewCommunity,
    NewCommunityMember, NewComment, NewLike, NewNotification, NewSession, NewUser, NewWish,
    NotificationData, NotificationKind, NotificationStatus, PrimaryKey, Privacy, Result,
    SessionData, UpdatedCommunity, UserData, WishData,
};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// A postgres database implementation for wishlane
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }

    /// Runs the embedded migrations
    pub async fn migrate(&self) -> std::result::Result<(), MigrateError> {
        MIGRATOR.run(&self.pool).await
    }
}

fn bad_column(column: &'static str, value: &str) -> DatabaseError {
    DatabaseError::Internal(format!("unexpected value for {column}: {value}").into())
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: PrimaryKey,
    email: String,
    password: String,
    name: Option<String>,
    avatar_url: Option<String>,
    description: Option<String>,
    privacy: String,
    is_guest: bool,
    is_influencer: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_data(self) -> Result<UserData> {
        let privacy =
            Privacy::parse(&self.privacy).ok_or_else(|| bad_column("privacy", &self.privacy))?;

        Ok(UserData {
            id: self.id,
            email: self.email,
            password: self.password,
            name: self.name,
            avatar_url: self.avatar_url,
            description: self.description,
            privacy,
            is_guest: self.is_guest,
            is_influencer: self.is_influencer,
            created_at: self.created_at,
        })
    }
}

/// A joined user, aliased with a `user_` prefix to avoid column collisions.
#[derive(Debug, FromRow)]
struct JoinedUserRow {
    user_id: PrimaryKey,
    user_email: String,
    user_password: String,
    user_name: Option<String>,
    user_avatar_url: Option<String>,
    user_description: Option<String>,
    user_privacy: String,
    user_is_guest: bool,
    user_is_influencer: bool,
    user_created_at: DateTime<Utc>,
}

impl JoinedUserRow {
    fn into_data(self) -> Result<UserData> {
        let privacy = Privacy::parse(&self.user_privacy)
            .ok_or_else(|| bad_column("privacy", &self.user_privacy))?;

        Ok(UserData {
            id: self.user_id,
            email: self.user_email,
            password: self.user_password,
            name: self.user_name,
            avatar_url: self.user_avatar_url,
            description: self.user_description,
            privacy,
            is_guest: self.user_is_guest,
            is_influencer: self.user_is_influencer,
            created_at: self.user_created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: PrimaryKey,
    token: String,
    expires_at: DateTime<Utc>,
    #[sqlx(flatten)]
    user: JoinedUserRow,
}

#[derive(Debug, FromRow)]
struct WishRow {
    id: PrimaryKey,
    owner_id: PrimaryKey,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    goal: f64,
    raised: f64,
    community_id: Option<PrimaryKey>,
    is_public: bool,
    created_at: DateTime<Utc>,
}

impl From<WishRow> for WishData {
    fn from(row: WishRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            goal: row.goal,
            raised: row.raised,
            community_id: row.community_id,
            is_public: row.is_public,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: PrimaryKey,
    recipient_id: PrimaryKey,
    sender_id: Option<PrimaryKey>,
    community_id: Option<PrimaryKey>,
    kind: String,
    message: String,
    status: String,
    is_read: bool,
    created_at: DateTime<Utc>,
    sender_avatar_url: Option<String>,
}

impl NotificationRow {
    fn into_data(self) -> Result<NotificationData> {
        let kind =
            NotificationKind::parse(&self.kind).ok_or_else(|| bad_column("kind", &self.kind))?;
        let status = NotificationStatus::parse(&self.status)
            .ok_or_else(|| bad_column("status", &self.status))?;

        Ok(NotificationData {
            id: self.id,
            recipient_id: self.recipient_id,
            sender_id: self.sender_id,
            community_id: self.community_id,
            kind,
            message: self.message,
            status,
            is_read: self.is_read,
            created_at: self.created_at,
            sender_avatar_url: self.sender_avatar_url,
        })
    }
}

#[derive(Debug, FromRow)]
struct CommunityRow {
    id: PrimaryKey,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    category: Option<String>,
    rules: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<CommunityRow> for CommunityData {
    fn from(row: CommunityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            category: row.category,
            rules: row.rules,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    id: PrimaryKey,
    community_id: PrimaryKey,
    role: String,
    is_online: bool,
    contributions: i32,
    joined_at: DateTime<Utc>,
    #[sqlx(flatten)]
    user: JoinedUserRow,
}

impl MemberRow {
    fn into_data(self) -> Result<CommunityMemberData> {
        let role =
            CommunityRole::parse(&self.role).ok_or_else(|| bad_column("role", &self.role))?;

        Ok(CommunityMemberData {
            id: self.id,
            community_id: self.community_id,
            role,
            is_online: self.is_online,
            contributions: self.contributions,
            joined_at: self.joined_at,
            user: self.user.into_data()?,
        })
    }
}

/// Selects a user's columns with the names `JoinedUserRow` expects.
const USER_COLUMNS: &str = "
    users.id AS user_id,
    users.email AS user_email,
    users.password AS user_password,
    users.name AS user_name,
    users.avatar_url AS user_avatar_url,
    users.description AS user_description,
    users.privacy AS user_privacy,
    users.is_guest AS user_is_guest,
    users.is_influencer AS user_is_influencer,
    users.created_at AS user_created_at";

#[async_trait]
impl Database for PgDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))?
            .into_data()
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "email"))?
            .into_data()
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_email(&new_user.email)
            .await
            .conflict_or_ok("user", "email", &new_user.email)?;

        let user_id: PrimaryKey = query_scalar(
            "INSERT INTO users (email, password, name, is_guest, is_influencer)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(&new_user.name)
        .bind(new_user.is_guest)
        .bind(new_user.is_influencer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.conflict_or_any("user", "email", &new_user.email))?;

        self.user_by_id(user_id).await
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        // Ensure user exists
        let _ = self.user_by_id(user_id).await?;

        query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let row = query_as::<_, SessionRow>(&format!(
            "SELECT
                sessions.id,
                sessions.token,
                sessions.expires_at,
                {USER_COLUMNS}
            FROM sessions
                INNER JOIN users ON sessions.user_id = users.id
            WHERE token = $1"
        ))
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("session", "token"))?;

        Ok(SessionData {
            id: row.id,
            token: row.token,
            expires_at: row.expires_at,
            user: row.user.into_data()?,
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let token: String = query_scalar(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)
             RETURNING token",
        )
        .bind(&new_session.token)
        .bind(new_session.user_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        query("DELETE FROM sessions WHERE expires_at < now()")
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn create_friendship(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<()> {
        // Both directions go in one transaction, so a partial edge is never
        // observable.
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        query("INSERT INTO friendships (user_id, friend_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        query("INSERT INTO friendships (user_id, friend_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())
    }

    async fn delete_friendship(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        query(
            "DELETE FROM friendships
             WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)",
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())
    }

    async fn friend_ids_of(&self, user_id: PrimaryKey) -> Result<Vec<PrimaryKey>> {
        query_scalar("SELECT friend_id FROM friendships WHERE user_id = $1 ORDER BY friend_id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn are_friends(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<bool> {
        query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2
            )",
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_wish(&self, new_wish: NewWish) -> Result<WishData> {
        let wish_id: PrimaryKey = query_scalar(
            "INSERT INTO wishes (owner_id, title, description, image_url, goal, community_id, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(new_wish.owner_id)
        .bind(&new_wish.title)
        .bind(&new_wish.description)
        .bind(&new_wish.image_url)
        .bind(new_wish.goal)
        .bind(new_wish.community_id)
        .bind(new_wish.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.wish_by_id(wish_id).await
    }

    async fn wish_by_id(&self, wish_id: PrimaryKey) -> Result<WishData> {
        query_as::<_, WishRow>("SELECT * FROM wishes WHERE id = $1")
            .bind(wish_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("wish", "id"))
            .map(Into::into)
    }

    async fn count_wishes_by_owner(&self, owner_id: PrimaryKey) -> Result<i64> {
        query_scalar("SELECT COUNT(*) FROM wishes WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData> {
        let notification_id: PrimaryKey = query_scalar(
            "INSERT INTO notifications (recipient_id, sender_id, community_id, kind, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(new_notification.recipient_id)
        .bind(new_notification.sender_id)
        .bind(new_notification.community_id)
        .bind(new_notification.kind.as_str())
        .bind(&new_notification.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.notification_by_id(notification_id).await
    }

    async fn notification_by_id(&self, notification_id: PrimaryKey) -> Result<NotificationData> {
        query_as::<_, NotificationRow>(
            "SELECT
                notifications.*,
                users.avatar_url AS sender_avatar_url
            FROM notifications
                LEFT JOIN users ON notifications.sender_id = users.id
            WHERE notifications.id = $1",
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("notification", "id"))?
        .into_data()
    }

    async fn list_notifications(
        &self,
        recipient_id: PrimaryKey,
        read_filter: Option<bool>,
        limit: i64,
    ) -> Result<Vec<NotificationData>> {
        let rows = query_as::<_, NotificationRow>(
            "SELECT
                notifications.*,
                users.avatar_url AS sender_avatar_url
            FROM notifications
                LEFT JOIN users ON notifications.sender_id = users.id
            WHERE notifications.recipient_id = $1
                AND ($2::BOOLEAN IS NULL OR notifications.is_read = $2)
            ORDER BY notifications.created_at DESC, notifications.id DESC
            LIMIT $3",
        )
        .bind(recipient_id)
        .bind(read_filter)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        rows.into_iter().map(|row| row.into_data()).collect()
    }

    async fn mark_notification_read(&self, notification_id: PrimaryKey) -> Result<()> {
        // Ensure notification exists
        let _ = self.notification_by_id(notification_id).await?;

        query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn resolve_notification(
        &self,
        notification_id: PrimaryKey,
        status: NotificationStatus,
    ) -> Result<NotificationData> {
        // Ensure notification exists
        let _ = self.notification_by_id(notification_id).await?;

        query("UPDATE notifications SET status = $1, is_read = TRUE WHERE id = $2")
            .bind(status.as_str())
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.notification_by_id(notification_id).await
    }

    async fn create_community(&self, new_community: NewCommunity) -> Result<CommunityData> {
        // The community and its admin membership are one transaction, so a
        // community can never exist without an admin.
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        let community_id: PrimaryKey = query_scalar(
            "INSERT INTO communities (name, description, image_url, category, rules)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&new_community.name)
        .bind(&new_community.description)
        .bind(&new_community.image_url)
        .bind(&new_community.category)
        .bind(&new_community.rules)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| e.any())?;

        query("INSERT INTO community_members (community_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(community_id)
            .bind(new_community.owner_id)
            .bind(CommunityRole::Admin.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())?;

        self.community_by_id(community_id).await
    }

    async fn community_by_id(&self, community_id: PrimaryKey) -> Result<CommunityData> {
        query_as::<_, CommunityRow>("SELECT * FROM communities WHERE id = $1")
            .bind(community_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("community", "id"))
            .map(Into::into)
    }

    async fn update_community(
        &self,
        updated_community: UpdatedCommunity,
    ) -> Result<CommunityData> {
        // A single statement, so concurrent partial updates cannot clobber
        // each other's fields.
        query_as::<_, CommunityRow>(
            "UPDATE communities SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                image_url = COALESCE($3, image_url),
                category = COALESCE($4, category),
                rules = COALESCE($5, rules),
                is_active = COALESCE($6, is_active)
            WHERE id = $7
            RETURNING *",
        )
        .bind(&updated_community.name)
        .bind(&updated_community.description)
        .bind(&updated_community.image_url)
        .bind(&updated_community.category)
        .bind(&updated_community.rules)
        .bind(updated_community.is_active)
        .bind(updated_community.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("community", "id"))
        .map(Into::into)
    }

    async fn delete_community(&self, community_id: PrimaryKey) -> Result<()> {
        // Ensure community exists; memberships, notifications and wish
        // associations cascade in the schema.
        let _ = self.community_by_id(community_id).await?;

        query("DELETE FROM communities WHERE id = $1")
            .bind(community_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn create_community_member(
        &self,
        new_member: NewCommunityMember,
    ) -> Result<CommunityMemberData> {
        // Ensure the user isn't a member of this community already
        self.community_member(new_member.community_id, new_member.user_id)
            .await
            .conflict_or_ok(
                "community member",
                "community:user",
                format!("{}:{}", new_member.community_id, new_member.user_id).as_str(),
            )?;

        query("INSERT INTO community_members (community_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(new_member.community_id)
            .bind(new_member.user_id)
            .bind(new_member.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // A concurrent join hits the unique constraint instead
                e.conflict_or_any(
                    "community member",
                    "community:user",
                    format!("{}:{}", new_member.community_id, new_member.user_id).as_str(),
                )
            })?;

        self.community_member(new_member.community_id, new_member.user_id)
            .await
    }

    async fn community_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<CommunityMemberData> {
        query_as::<_, MemberRow>(&format!(
            "SELECT
                community_members.id,
                community_members.community_id,
                community_members.role,
                community_members.is_online,
                community_members.contributions,
                community_members.joined_at,
                {USER_COLUMNS}
            FROM community_members
                INNER JOIN users ON community_members.user_id = users.id
            WHERE community_id = $1 AND user_id = $2"
        ))
        .bind(community_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("community member", "community:user"))?
        .into_data()
    }

    async fn list_community_members(
        &self,
        community_id: PrimaryKey,
    ) -> Result<Vec<CommunityMemberData>> {
        let rows = query_as::<_, MemberRow>(&format!(
            "SELECT
                community_members.id,
                community_members.community_id,
                community_members.role,
                community_members.is_online,
                community_members.contributions,
                community_members.joined_at,
                {USER_COLUMNS}
            FROM community_members
                INNER JOIN users ON community_members.user_id = users.id
            WHERE community_id = $1
            ORDER BY community_members.joined_at, community_members.id"
        ))
        .bind(community_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        rows.into_iter().map(|row| row.into_data()).collect()
    }

    async fn delete_community_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<()> {
        let member = self.community_member(community_id, user_id).await?;

        query("DELETE FROM community_members WHERE id = $1")
            .bind(member.id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn create_like(&self, new_like: NewLike) -> Result<LikeData> {
        let row = query_as::<_, (PrimaryKey, DateTime<Utc>)>(
            "INSERT INTO likes (user_id, wish_id) VALUES ($1, $2)
             RETURNING id, created_at",
        )
        .bind(new_like.user_id)
        .bind(new_like.wish_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            e.conflict_or_any(
                "like",
                "user:wish",
                format!("{}:{}", new_like.user_id, new_like.wish_id).as_str(),
            )
        })?;

        Ok(LikeData {
            id: row.0,
            user_id: new_like.user_id,
            wish_id: new_like.wish_id,
            created_at: row.1,
        })
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData> {
        let row = query_as::<_, (PrimaryKey, DateTime<Utc>)>(
            "INSERT INTO comments (user_id, wish_id, content) VALUES ($1, $2, $3)
             RETURNING id, created_at",
        )
        .bind(new_comment.user_id)
        .bind(new_comment.wish_id)
        .bind(&new_comment.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(CommentData {
            id: row.0,
            user_id: new_comment.user_id,
            wish_id: new_comment.wish_id,
            content: new_comment.content,
            created_at: row.1,
        })
    }

    async fn create_activity(&self, new_activity: NewActivity) -> Result<ActivityData> {
        let row = query_as::<_, (PrimaryKey, DateTime<Utc>)>(
            "INSERT INTO activities (user_id, kind, target_type, target_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, created_at",
        )
        .bind(new_activity.user_id)
        .bind(new_activity.kind.as_str())
        .bind(&new_activity.target_type)
        .bind(new_activity.target_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(ActivityData {
            id: row.0,
            user_id: new_activity.user_id,
            kind: new_activity.kind,
            target_type: new_activity.target_type,
            target_id: new_activity.target_id,
            created_at: row.1,
        })
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }

    fn conflict_or_any(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError {
        let is_unique_violation = self
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);

        if is_unique_violation {
            DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }
        } else {
            Self::any(self)
        }
    }
}
