use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::db::{
    ActivityData, CommentData, CommunityData, CommunityMemberData, CommunityRole, Database,
    DatabaseError, LikeData, NewActivity, NewCommunity, NewCommunityMember,
    NewComment, NewLike, NewNotification, NewSession, NewUser, NewWish, NotificationData,
    NotificationStatus, PrimaryKey, Privacy, Result, SessionData, UpdatedCommunity, UserData,
    WishData,
};

/// An in-memory database used in tests and local development.
///
/// A single lock around the whole state makes every operation atomic, which
/// mirrors the transactional guarantees of [`super::PgDatabase`].
#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Clone)]
struct MemberRecord {
    id: PrimaryKey,
    community_id: PrimaryKey,
    user_id: PrimaryKey,
    role: CommunityRole,
    is_online: bool,
    contributions: i32,
    joined_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    next_id: PrimaryKey,
    users: HashMap<PrimaryKey, UserData>,
    sessions: Vec<SessionData>,
    /// Directed edges; the symmetric pair is always inserted/removed together
    friendships: HashSet<(PrimaryKey, PrimaryKey)>,
    wishes: HashMap<PrimaryKey, WishData>,
    notifications: HashMap<PrimaryKey, NotificationData>,
    communities: HashMap<PrimaryKey, CommunityData>,
    members: Vec<MemberRecord>,
    likes: Vec<LikeData>,
    comments: Vec<CommentData>,
    activities: Vec<ActivityData>,
}

impl MemoryState {
    fn alloc(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }

    fn member_to_data(&self, record: &MemberRecord) -> Result<CommunityMemberData> {
        let user = self
            .users
            .get(&record.user_id)
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        Ok(CommunityMemberData {
            id: record.id,
            community_id: record.community_id,
            role: record.role,
            is_online: record.is_online,
            contributions: record.contributions,
            joined_at: record.joined_at,
            user: user.clone(),
        })
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        self.state
            .lock()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "email",
            })
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut state = self.state.lock();

        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field: "email",
                value: new_user.email,
            });
        }

        let id = state.alloc();
        let user = UserData {
            id,
            email: new_user.email,
            password: new_user.password,
            name: new_user.name,
            avatar_url: None,
            description: None,
            privacy: Privacy::Public,
            is_guest: new_user.is_guest,
            is_influencer: new_user.is_influencer,
            created_at: Utc::now(),
        };

        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        state.users.remove(&user_id).ok_or(DatabaseError::NotFound {
            resource: "user",
            identifier: "id",
        })?;

        // Mirror the cascades of the real schema
        state.sessions.retain(|s| s.user.id != user_id);
        state
            .friendships
            .retain(|(a, b)| *a != user_id && *b != user_id);
        let owned_wishes: HashSet<_> = state
            .wishes
            .values()
            .filter(|w| w.owner_id == user_id)
            .map(|w| w.id)
            .collect();
        state.wishes.retain(|_, w| w.owner_id != user_id);
        state
            .likes
            .retain(|l| l.user_id != user_id && !owned_wishes.contains(&l.wish_id));
        state
            .comments
            .retain(|c| c.user_id != user_id && !owned_wishes.contains(&c.wish_id));
        state.notifications.retain(|_, n| n.recipient_id != user_id);
        for notification in state.notifications.values_mut() {
            if notification.sender_id == Some(user_id) {
                notification.sender_id = None;
                notification.sender_avatar_url = None;
            }
        }
        state.members.retain(|m| m.user_id != user_id);
        state.activities.retain(|a| a.user_id != user_id);

        Ok(())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        self.state
            .lock()
            .sessions
            .iter()
            .find(|s| s.token == token)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        let mut state = self.state.lock();

        if state.sessions.iter().any(|s| s.token == new_session.token) {
            return Err(DatabaseError::Conflict {
                resource: "session",
                field: "token",
                value: new_session.token,
            });
        }

        let user = state
            .users
            .get(&new_session.user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        let id = state.alloc();
        let session = SessionData {
            id,
            token: new_session.token,
            expires_at: new_session.expires_at,
            user,
        };

        state.sessions.push(session.clone());
        Ok(session)
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.sessions.len();

        state.sessions.retain(|s| s.token != token);

        if state.sessions.len() == before {
            return Err(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            });
        }

        Ok(())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        let now = Utc::now();
        self.state.lock().sessions.retain(|s| s.expires_at > now);
        Ok(())
    }

    async fn create_friendship(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        state.friendships.insert((user_id, friend_id));
        state.friendships.insert((friend_id, user_id));

        Ok(())
    }

    async fn delete_friendship(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        state.friendships.remove(&(user_id, friend_id));
        state.friendships.remove(&(friend_id, user_id));

        Ok(())
    }

    async fn friend_ids_of(&self, user_id: PrimaryKey) -> Result<Vec<PrimaryKey>> {
        let mut ids: Vec<_> = self
            .state
            .lock()
            .friendships
            .iter()
            .filter(|(a, _)| *a == user_id)
            .map(|(_, b)| *b)
            .collect();

        ids.sort_unstable();
        Ok(ids)
    }

    async fn are_friends(&self, user_id: PrimaryKey, friend_id: PrimaryKey) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .friendships
            .contains(&(user_id, friend_id)))
    }

    async fn create_wish(&self, new_wish: NewWish) -> Result<WishData> {
        let mut state = self.state.lock();
        let id = state.alloc();

        let wish = WishData {
            id,
            owner_id: new_wish.owner_id,
            title: new_wish.title,
            description: new_wish.description,
            image_url: new_wish.image_url,
            goal: new_wish.goal,
            raised: 0.0,
            community_id: new_wish.community_id,
            is_public: new_wish.is_public,
            created_at: Utc::now(),
        };

        state.wishes.insert(id, wish.clone());
        Ok(wish)
    }

    async fn wish_by_id(&self, wish_id: PrimaryKey) -> Result<WishData> {
        self.state
            .lock()
            .wishes
            .get(&wish_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "wish",
                identifier: "id",
            })
    }

    async fn count_wishes_by_owner(&self, owner_id: PrimaryKey) -> Result<i64> {
        Ok(self
            .state
            .lock()
            .wishes
            .values()
            .filter(|w| w.owner_id == owner_id)
            .count() as i64)
    }

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData> {
        let mut state = self.state.lock();

        let sender_avatar_url = new_notification
            .sender_id
            .and_then(|id| state.users.get(&id))
            .and_then(|u| u.avatar_url.clone());

        let id = state.alloc();
        let notification = NotificationData {
            id,
            recipient_id: new_notification.recipient_id,
            sender_id: new_notification.sender_id,
            community_id: new_notification.community_id,
            kind: new_notification.kind,
            message: new_notification.message,
            status: NotificationStatus::Pending,
            is_read: false,
            created_at: Utc::now(),
            sender_avatar_url,
        };

        state.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn notification_by_id(&self, notification_id: PrimaryKey) -> Result<NotificationData> {
        self.state
            .lock()
            .notifications
            .get(&notification_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "notification",
                identifier: "id",
            })
    }

    async fn list_notifications(
        &self,
        recipient_id: PrimaryKey,
        read_filter: Option<bool>,
        limit: i64,
    ) -> Result<Vec<NotificationData>> {
        let mut notifications: Vec<_> = self
            .state
            .lock()
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .filter(|n| read_filter.map(|read| n.is_read == read).unwrap_or(true))
            .cloned()
            .collect();

        notifications.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        notifications.truncate(limit.max(0) as usize);

        Ok(notifications)
    }

    async fn mark_notification_read(&self, notification_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        let notification =
            state
                .notifications
                .get_mut(&notification_id)
                .ok_or(DatabaseError::NotFound {
                    resource: "notification",
                    identifier: "id",
                })?;

        notification.is_read = true;
        Ok(())
    }

    async fn resolve_notification(
        &self,
        notification_id: PrimaryKey,
        status: NotificationStatus,
    ) -> Result<NotificationData> {
        let mut state = self.state.lock();

        let notification =
            state
                .notifications
                .get_mut(&notification_id)
                .ok_or(DatabaseError::NotFound {
                    resource: "notification",
                    identifier: "id",
                })?;

        notification.status = status;
        notification.is_read = true;

        Ok(notification.clone())
    }

    async fn create_community(&self, new_community: NewCommunity) -> Result<CommunityData> {
        let mut state = self.state.lock();

        if !state.users.contains_key(&new_community.owner_id) {
            return Err(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            });
        }

        let id = state.alloc();
        let community = CommunityData {
            id,
            name: new_community.name,
            description: new_community.description,
            image_url: new_community.image_url,
            category: new_community.category,
            rules: new_community.rules,
            is_active: true,
            created_at: Utc::now(),
        };

        state.communities.insert(id, community.clone());

        // Single lock, so the admin membership lands atomically with the
        // community
        let member_id = state.alloc();
        state.members.push(MemberRecord {
            id: member_id,
            community_id: id,
            user_id: new_community.owner_id,
            role: CommunityRole::Admin,
            is_online: false,
            contributions: 0,
            joined_at: Utc::now(),
        });

        Ok(community)
    }

    async fn community_by_id(&self, community_id: PrimaryKey) -> Result<CommunityData> {
        self.state
            .lock()
            .communities
            .get(&community_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "community",
                identifier: "id",
            })
    }

    async fn update_community(
        &self,
        updated_community: UpdatedCommunity,
    ) -> Result<CommunityData> {
        let mut state = self.state.lock();

        let community =
            state
                .communities
                .get_mut(&updated_community.id)
                .ok_or(DatabaseError::NotFound {
                    resource: "community",
                    identifier: "id",
                })?;

        if let Some(name) = updated_community.name {
            community.name = name;
        }
        if let Some(description) = updated_community.description {
            community.description = Some(description);
        }
        if let Some(image_url) = updated_community.image_url {
            community.image_url = Some(image_url);
        }
        if let Some(category) = updated_community.category {
            community.category = Some(category);
        }
        if let Some(rules) = updated_community.rules {
            community.rules = Some(rules);
        }
        if let Some(is_active) = updated_community.is_active {
            community.is_active = is_active;
        }

        Ok(community.clone())
    }

    async fn delete_community(&self, community_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        state
            .communities
            .remove(&community_id)
            .ok_or(DatabaseError::NotFound {
                resource: "community",
                identifier: "id",
            })?;

        state.members.retain(|m| m.community_id != community_id);
        state
            .notifications
            .retain(|_, n| n.community_id != Some(community_id));
        for wish in state.wishes.values_mut() {
            if wish.community_id == Some(community_id) {
                wish.community_id = None;
            }
        }

        Ok(())
    }

    async fn create_community_member(
        &self,
        new_member: NewCommunityMember,
    ) -> Result<CommunityMemberData> {
        let mut state = self.state.lock();

        if !state.communities.contains_key(&new_member.community_id) {
            return Err(DatabaseError::NotFound {
                resource: "community",
                identifier: "id",
            });
        }

        let exists = state
            .members
            .iter()
            .any(|m| m.community_id == new_member.community_id && m.user_id == new_member.user_id);

        if exists {
            return Err(DatabaseError::Conflict {
                resource: "community member",
                field: "community:user",
                value: format!("{}:{}", new_member.community_id, new_member.user_id),
            });
        }

        let id = state.alloc();
        let record = MemberRecord {
            id,
            community_id: new_member.community_id,
            user_id: new_member.user_id,
            role: new_member.role,
            is_online: false,
            contributions: 0,
            joined_at: Utc::now(),
        };

        let member = state.member_to_data(&record)?;
        state.members.push(record);

        Ok(member)
    }

    async fn community_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<CommunityMemberData> {
        let state = self.state.lock();

        let record = state
            .members
            .iter()
            .find(|m| m.community_id == community_id && m.user_id == user_id)
            .ok_or(DatabaseError::NotFound {
                resource: "community member",
                identifier: "community:user",
            })?;

        state.member_to_data(record)
    }

    async fn list_community_members(
        &self,
        community_id: PrimaryKey,
    ) -> Result<Vec<CommunityMemberData>> {
        let state = self.state.lock();

        state
            .members
            .iter()
            .filter(|m| m.community_id == community_id)
            .map(|m| state.member_to_data(m))
            .collect()
    }

    async fn delete_community_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.members.len();

        state
            .members
            .retain(|m| !(m.community_id == community_id && m.user_id == user_id));

        if state.members.len() == before {
            return Err(DatabaseError::NotFound {
                resource: "community member",
                identifier: "community:user",
            });
        }

        Ok(())
    }

    async fn create_like(&self, new_like: NewLike) -> Result<LikeData> {
        let mut state = self.state.lock();

        let exists = state
            .likes
            .iter()
            .any(|l| l.user_id == new_like.user_id && l.wish_id == new_like.wish_id);

        if exists {
            return Err(DatabaseError::Conflict {
                resource: "like",
                field: "user:wish",
                value: format!("{}:{}", new_like.user_id, new_like.wish_id),
            });
        }

        let id = state.alloc();
        let like = LikeData {
            id,
            user_id: new_like.user_id,
            wish_id: new_like.wish_id,
            created_at: Utc::now(),
        };

        state.likes.push(like.clone());
        Ok(like)
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData> {
        let mut state = self.state.lock();
        let id = state.alloc();

        let comment = CommentData {
            id,
            user_id: new_comment.user_id,
            wish_id: new_comment.wish_id,
            content: new_comment.content,
            created_at: Utc::now(),
        };

        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn create_activity(&self, new_activity: NewActivity) -> Result<ActivityData> {
        let mut state = self.state.lock();
        let id = state.alloc();

        let activity = ActivityData {
            id,
            user_id: new_activity.user_id,
            kind: new_activity.kind,
            target_type: new_activity.target_type,
            target_id: new_activity.target_id,
            created_at: Utc::now(),
        };

        state.activities.push(activity.clone());
        Ok(activity)
    }
}
