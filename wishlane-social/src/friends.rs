use std::collections::HashSet;

use log::info;
use thiserror::Error;

use crate::{util::assert_not_guest, Database, DatabaseError, PrimaryKey, SocialContext, UserData};

/// Owns the symmetric friend-edge set and mutual-friend computation.
///
/// Friendship is an undirected edge: if A is a friend of B, then B is a
/// friend of A. The storage layer writes both directed rows in one
/// transaction, so a half-written edge is never observable.
pub struct Friends<Db> {
    context: SocialContext<Db>,
}

#[derive(Debug, Error)]
pub enum FriendsError {
    #[error("Cannot add yourself as a friend")]
    SelfFriendship,
    #[error("Guests must register before managing friends")]
    GuestRestricted,
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// A friend as returned by [`Friends::list_friends`]
#[derive(Debug, Clone)]
pub struct FriendView {
    pub user: UserData,
    /// How many friends this friend shares with the requesting user
    pub mutual_friends: usize,
    /// How many wishes this friend has published
    pub wish_count: i64,
}

impl<Db> Friends<Db>
where
    Db: Database,
{
    pub fn new(context: &SocialContext<Db>) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Adds the edge between the actor and the target, in both directions.
    /// Adding an existing friend is a no-op.
    pub async fn add_friend(
        &self,
        actor: &UserData,
        friend_id: PrimaryKey,
    ) -> Result<(), FriendsError> {
        assert_not_guest(actor, FriendsError::GuestRestricted)?;

        if actor.id == friend_id {
            return Err(FriendsError::SelfFriendship);
        }

        // Surfaces NotFound before any write happens
        let friend = self.context.database.user_by_id(friend_id).await?;

        self.context
            .database
            .create_friendship(actor.id, friend.id)
            .await?;

        info!("user {} added user {} as a friend", actor.id, friend.id);
        Ok(())
    }

    /// Removes the edge in both directions. Removing an absent edge succeeds
    /// silently.
    pub async fn remove_friend(
        &self,
        actor: &UserData,
        friend_id: PrimaryKey,
    ) -> Result<(), FriendsError> {
        assert_not_guest(actor, FriendsError::GuestRestricted)?;

        let friend = self.context.database.user_by_id(friend_id).await?;

        self.context
            .database
            .delete_friendship(actor.id, friend.id)
            .await?;

        Ok(())
    }

    /// Every friend of the user, annotated with the mutual-friend count and
    /// the friend's wish count.
    pub async fn list_friends(&self, user_id: PrimaryKey) -> Result<Vec<FriendView>, FriendsError> {
        let friend_ids = self.context.database.friend_ids_of(user_id).await?;
        let id_set: HashSet<_> = friend_ids.iter().copied().collect();

        let mut friends = Vec::with_capacity(friend_ids.len());

        for friend_id in friend_ids {
            let user = self.context.database.user_by_id(friend_id).await?;
            let wish_count = self
                .context
                .database
                .count_wishes_by_owner(friend_id)
                .await?;

            let mutual_friends = self
                .context
                .database
                .friend_ids_of(friend_id)
                .await?
                .into_iter()
                .filter(|id| id_set.contains(id))
                .count();

            friends.push(FriendView {
                user,
                mutual_friends,
                wish_count,
            });
        }

        Ok(friends)
    }

    /// Size of the intersection of both users' friend-id sets.
    pub async fn count_mutual_friends(
        &self,
        user_a: PrimaryKey,
        user_b: PrimaryKey,
    ) -> Result<usize, FriendsError> {
        let friends_a: HashSet<_> = self
            .context
            .database
            .friend_ids_of(user_a)
            .await?
            .into_iter()
            .collect();

        let count = self
            .context
            .database
            .friend_ids_of(user_b)
            .await?
            .into_iter()
            .filter(|id| friends_a.contains(id))
            .count();

        Ok(count)
    }

    /// Symmetric membership test.
    pub async fn check_are_friends(
        &self,
        user_a: PrimaryKey,
        user_b: PrimaryKey,
    ) -> Result<bool, FriendsError> {
        Ok(self.context.database.are_friends(user_a, user_b).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDatabase, NewWish, Social};

    async fn user(social: &Social<MemoryDatabase>, email: &str) -> UserData {
        social
            .database()
            .create_user(crate::NewUser {
                email: email.to_string(),
                password: "hash".to_string(),
                name: None,
                is_guest: false,
                is_influencer: false,
            })
            .await
            .expect("creates user")
    }

    async fn guest(social: &Social<MemoryDatabase>, email: &str) -> UserData {
        social
            .database()
            .create_user(crate::NewUser {
                email: email.to_string(),
                password: "hash".to_string(),
                name: None,
                is_guest: true,
                is_influencer: false,
            })
            .await
            .expect("creates guest")
    }

    #[tokio::test]
    async fn test_add_friend_is_symmetric() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        social.friends.add_friend(&a, b.id).await.expect("adds");

        assert!(social.friends.check_are_friends(a.id, b.id).await.unwrap());
        assert!(social.friends.check_are_friends(b.id, a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_friend_is_idempotent() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        social.friends.add_friend(&a, b.id).await.expect("adds");
        social
            .friends
            .add_friend(&a, b.id)
            .await
            .expect("second add is a no-op");

        let friends = social.friends.list_friends(a.id).await.unwrap();
        assert_eq!(friends.len(), 1, "no duplicate edges");
    }

    #[tokio::test]
    async fn test_self_friendship_is_rejected() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let result = social.friends.add_friend(&a, a.id).await;
        assert!(matches!(result, Err(FriendsError::SelfFriendship)));
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let result = social.friends.add_friend(&a, 999).await;
        assert!(matches!(
            result,
            Err(FriendsError::Db(DatabaseError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_guest_cannot_add_friends() {
        let social = Social::new(MemoryDatabase::new());
        let g = guest(&social, "guest@example.com").await;
        let b = user(&social, "b@example.com").await;

        let result = social.friends.add_friend(&g, b.id).await;
        assert!(matches!(result, Err(FriendsError::GuestRestricted)));
        assert!(!social.friends.check_are_friends(g.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_friend_removes_both_directions() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        social.friends.add_friend(&a, b.id).await.expect("adds");
        social
            .friends
            .remove_friend(&b, a.id)
            .await
            .expect("removes");

        assert!(!social.friends.check_are_friends(a.id, b.id).await.unwrap());
        assert!(!social.friends.check_are_friends(b.id, a.id).await.unwrap());

        // Removing again is harmless
        social
            .friends
            .remove_friend(&b, a.id)
            .await
            .expect("removing an absent edge succeeds");
    }

    #[tokio::test]
    async fn test_mutual_friend_count() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;
        let c = user(&social, "c@example.com").await;
        let d = user(&social, "d@example.com").await;

        // a-b, a-c, b-c, b-d: a and b share exactly {c}
        social.friends.add_friend(&a, b.id).await.unwrap();
        social.friends.add_friend(&a, c.id).await.unwrap();
        social.friends.add_friend(&b, c.id).await.unwrap();
        social.friends.add_friend(&b, d.id).await.unwrap();

        assert_eq!(
            social.friends.count_mutual_friends(a.id, b.id).await.unwrap(),
            1
        );
        assert_eq!(
            social.friends.count_mutual_friends(a.id, d.id).await.unwrap(),
            1,
            "a and d share b"
        );
        assert_eq!(
            social.friends.count_mutual_friends(c.id, d.id).await.unwrap(),
            1,
            "c and d share b"
        );
    }

    #[tokio::test]
    async fn test_list_friends_reports_counts() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;
        let c = user(&social, "c@example.com").await;

        social.friends.add_friend(&a, b.id).await.unwrap();
        social.friends.add_friend(&a, c.id).await.unwrap();
        social.friends.add_friend(&b, c.id).await.unwrap();

        social
            .database()
            .create_wish(NewWish {
                owner_id: b.id,
                title: "New bike".to_string(),
                description: None,
                image_url: None,
                goal: 500.0,
                community_id: None,
                is_public: true,
            })
            .await
            .unwrap();

        let friends = social.friends.list_friends(a.id).await.unwrap();
        assert_eq!(friends.len(), 2);

        let view_b = friends.iter().find(|f| f.user.id == b.id).unwrap();
        assert_eq!(view_b.wish_count, 1);
        assert_eq!(view_b.mutual_friends, 1, "a and b share c");
    }
}
