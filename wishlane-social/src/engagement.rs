use thiserror::Error;

use crate::{
    util::assert_not_guest, ActivityKind, CommentData, Database, DatabaseError, LikeData,
    NewActivity, NewComment, NewLike, NewNotification, NewWish, NotificationKind, PrimaryKey,
    SocialContext, UserData, WishData,
};

/// Records wishes, likes, and comments, and appends to the activity feed.
///
/// Activity rows are written after the engagement row itself. A failed
/// activity write loses feed history but never the engagement.
pub struct Engagement<Db> {
    context: SocialContext<Db>,
}

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("Guests must register before doing this")]
    GuestRestricted,
    #[error("You already liked this wish")]
    AlreadyLiked,
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// Fields accepted when publishing a wish
#[derive(Debug)]
pub struct NewWishOptions {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub goal: f64,
    pub community_id: Option<PrimaryKey>,
    pub is_public: bool,
}

impl<Db> Engagement<Db>
where
    Db: Database,
{
    pub fn new(context: &SocialContext<Db>) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Publishes a wish owned by the actor.
    pub async fn create_wish(
        &self,
        actor: &UserData,
        options: NewWishOptions,
    ) -> Result<WishData, EngagementError> {
        assert_not_guest(actor, EngagementError::GuestRestricted)?;

        if let Some(community_id) = options.community_id {
            self.context.database.community_by_id(community_id).await?;
        }

        let wish = self
            .context
            .database
            .create_wish(NewWish {
                owner_id: actor.id,
                title: options.title,
                description: options.description,
                image_url: options.image_url,
                goal: options.goal,
                community_id: options.community_id,
                is_public: options.is_public,
            })
            .await?;

        self.record(actor.id, ActivityKind::CreateWish, "wish", wish.id)
            .await?;

        Ok(wish)
    }

    pub async fn wish(&self, wish_id: PrimaryKey) -> Result<WishData, EngagementError> {
        Ok(self.context.database.wish_by_id(wish_id).await?)
    }

    /// Likes a wish. Liking the same wish twice is an error.
    pub async fn like_wish(
        &self,
        actor: &UserData,
        wish_id: PrimaryKey,
    ) -> Result<LikeData, EngagementError> {
        assert_not_guest(actor, EngagementError::GuestRestricted)?;

        let wish = self.context.database.wish_by_id(wish_id).await?;

        let like = self
            .context
            .database
            .create_like(NewLike {
                user_id: actor.id,
                wish_id: wish.id,
            })
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    EngagementError::AlreadyLiked
                } else {
                    e.into()
                }
            })?;

        self.record(actor.id, ActivityKind::Like, "wish", wish.id)
            .await?;

        self.notify_owner(
            actor,
            &wish,
            format!("{} liked your wish {}", actor.display_name(), wish.title),
        )
        .await?;

        Ok(like)
    }

    pub async fn comment_wish(
        &self,
        actor: &UserData,
        wish_id: PrimaryKey,
        content: String,
    ) -> Result<CommentData, EngagementError> {
        assert_not_guest(actor, EngagementError::GuestRestricted)?;

        let wish = self.context.database.wish_by_id(wish_id).await?;

        let comment = self
            .context
            .database
            .create_comment(NewComment {
                user_id: actor.id,
                wish_id: wish.id,
                content,
            })
            .await?;

        self.record(actor.id, ActivityKind::Comment, "wish", wish.id)
            .await?;

        self.notify_owner(
            actor,
            &wish,
            format!(
                "{} commented on your wish {}",
                actor.display_name(),
                wish.title
            ),
        )
        .await?;

        Ok(comment)
    }

    /// Owners aren't notified about their own engagement.
    async fn notify_owner(
        &self,
        actor: &UserData,
        wish: &WishData,
        message: String,
    ) -> Result<(), EngagementError> {
        if actor.id == wish.owner_id {
            return Ok(());
        }

        self.context
            .database
            .create_notification(NewNotification {
                recipient_id: wish.owner_id,
                sender_id: Some(actor.id),
                community_id: None,
                kind: NotificationKind::Message,
                message,
            })
            .await?;

        Ok(())
    }

    async fn record(
        &self,
        user_id: PrimaryKey,
        kind: ActivityKind,
        target_type: &str,
        target_id: PrimaryKey,
    ) -> Result<(), EngagementError> {
        self.context
            .database
            .create_activity(NewActivity {
                user_id,
                kind,
                target_type: Some(target_type.to_string()),
                target_id: Some(target_id),
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDatabase, NewUser, Social};

    async fn user(social: &Social<MemoryDatabase>, email: &str) -> UserData {
        social
            .database()
            .create_user(NewUser {
                email: email.to_string(),
                password: "hash".to_string(),
                name: None,
                is_guest: false,
                is_influencer: false,
            })
            .await
            .expect("creates user")
    }

    fn options(title: &str) -> NewWishOptions {
        NewWishOptions {
            title: title.to_string(),
            description: None,
            image_url: None,
            goal: 100.0,
            community_id: None,
            is_public: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_wish() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let wish = social
            .engagement
            .create_wish(&a, options("New bike"))
            .await
            .expect("creates");

        let fetched = social.engagement.wish(wish.id).await.expect("fetches");
        assert_eq!(fetched.title, "New bike");
        assert_eq!(fetched.owner_id, a.id);
        assert_eq!(fetched.raised, 0.0);
    }

    #[tokio::test]
    async fn test_double_like_is_rejected() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let wish = social
            .engagement
            .create_wish(&a, options("New bike"))
            .await
            .expect("creates");

        social.engagement.like_wish(&b, wish.id).await.expect("likes");

        let again = social.engagement.like_wish(&b, wish.id).await;
        assert!(matches!(again, Err(EngagementError::AlreadyLiked)));
    }

    #[tokio::test]
    async fn test_engagement_notifies_the_owner() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let wish = social
            .engagement
            .create_wish(&a, options("New bike"))
            .await
            .expect("creates");

        social.engagement.like_wish(&b, wish.id).await.expect("likes");
        social
            .engagement
            .comment_wish(&b, wish.id, "nice".to_string())
            .await
            .expect("comments");

        let notifications = social.notifications.list(&a, None, 25).await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|n| n.sender_id == Some(b.id)));

        // Liking your own wish stays quiet
        social.engagement.like_wish(&a, wish.id).await.expect("likes");
        let notifications = social.notifications.list(&a, None, 25).await.unwrap();
        assert_eq!(notifications.len(), 2);
    }

    #[tokio::test]
    async fn test_guest_cannot_engage() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let guest = social
            .database()
            .create_user(NewUser {
                email: "guest@example.com".to_string(),
                password: "hash".to_string(),
                name: None,
                is_guest: true,
                is_influencer: false,
            })
            .await
            .unwrap();

        let wish = social
            .engagement
            .create_wish(&a, options("New bike"))
            .await
            .expect("creates");

        let like = social.engagement.like_wish(&guest, wish.id).await;
        assert!(matches!(like, Err(EngagementError::GuestRestricted)));

        let comment = social
            .engagement
            .comment_wish(&guest, wish.id, "nice".to_string())
            .await;
        assert!(matches!(comment, Err(EngagementError::GuestRestricted)));
    }

    #[tokio::test]
    async fn test_wish_in_unknown_community_is_not_found() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let result = social
            .engagement
            .create_wish(
                &a,
                NewWishOptions {
                    community_id: Some(999),
                    ..options("New bike")
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(EngagementError::Db(DatabaseError::NotFound { .. }))
        ));
    }
}
