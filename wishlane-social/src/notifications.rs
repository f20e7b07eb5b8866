use log::info;
use thiserror::Error;

use crate::{
    util::assert_not_guest, Communities, CommunityError, Database, DatabaseError, Friends,
    FriendsError, NewNotification, NotificationData, NotificationKind, NotificationStatus,
    PrimaryKey, SocialContext, UserData,
};

/// Drives the notification state machine.
///
/// Request notifications start out pending and move exactly once to a
/// terminal status. Accepting one applies its side effect (the friendship
/// edge, or the community membership) before the status flips, so a
/// notification is never accepted without its effect. Accepting an
/// already-accepted request is tolerated and reports the existing state.
pub struct Notifications<Db> {
    context: SocialContext<Db>,
    friends: Friends<Db>,
    communities: Communities<Db>,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Guests must register before doing this")]
    GuestRestricted,
    #[error("Cannot send a request to yourself")]
    SelfRequest,
    #[error("You are already friends with this user")]
    AlreadyFriends,
    #[error("You are already a member of this community")]
    AlreadyMember,
    #[error("This notification is addressed to someone else")]
    NotRecipient,
    #[error("This notification has already been resolved")]
    AlreadyResolved,
    #[error("A {kind} notification does not support this action")]
    UnsupportedKind { kind: &'static str },
    #[error("This notification has no sender")]
    MissingSender,
    #[error("This notification has no community")]
    MissingCommunity,
    #[error(transparent)]
    Friends(#[from] FriendsError),
    #[error(transparent)]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// What accepting a request notification resulted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    FriendAdded,
    /// The friendship already existed, which can happen when two requests
    /// cross. The notification still resolves to accepted.
    AlreadyFriends,
    MemberAdded,
    /// The sender was already a member, usually because another admin
    /// accepted their request first.
    AlreadyMember,
}

impl<Db> Notifications<Db>
where
    Db: Database,
{
    pub fn new(context: &SocialContext<Db>) -> Self {
        Self {
            context: context.clone(),
            friends: Friends::new(context),
            communities: Communities::new(context),
        }
    }

    /// Sends a pending friend request to the recipient.
    pub async fn send_friend_request(
        &self,
        actor: &UserData,
        recipient_id: PrimaryKey,
        message: Option<String>,
    ) -> Result<NotificationData, NotificationError> {
        assert_not_guest(actor, NotificationError::GuestRestricted)?;

        if actor.id == recipient_id {
            return Err(NotificationError::SelfRequest);
        }

        let recipient = self.context.database.user_by_id(recipient_id).await?;

        if self.friends.check_are_friends(actor.id, recipient.id).await? {
            return Err(NotificationError::AlreadyFriends);
        }

        let message = message
            .unwrap_or_else(|| format!("{} sent you a friend request", actor.display_name()));

        let notification = self
            .context
            .database
            .create_notification(NewNotification {
                recipient_id: recipient.id,
                sender_id: Some(actor.id),
                community_id: None,
                kind: NotificationKind::FriendRequest,
                message,
            })
            .await?;

        info!(
            "user {} sent a friend request to user {}",
            actor.id, recipient.id
        );

        Ok(notification)
    }

    /// Sends a plain message notification. These don't resolve, only dismiss.
    pub async fn send_message(
        &self,
        actor: &UserData,
        recipient_id: PrimaryKey,
        message: String,
    ) -> Result<NotificationData, NotificationError> {
        assert_not_guest(actor, NotificationError::GuestRestricted)?;

        let recipient = self.context.database.user_by_id(recipient_id).await?;

        Ok(self
            .context
            .database
            .create_notification(NewNotification {
                recipient_id: recipient.id,
                sender_id: Some(actor.id),
                community_id: None,
                kind: NotificationKind::Message,
                message,
            })
            .await?)
    }

    /// Sends a join request for the community to each of its admins.
    pub async fn send_join_request(
        &self,
        actor: &UserData,
        community_id: PrimaryKey,
    ) -> Result<Vec<NotificationData>, NotificationError> {
        assert_not_guest(actor, NotificationError::GuestRestricted)?;

        let community = self.context.database.community_by_id(community_id).await?;

        if self.communities.is_member(community.id, actor.id).await? {
            return Err(NotificationError::AlreadyMember);
        }

        let message = format!(
            "{} wants to join {}",
            actor.display_name(),
            community.name
        );

        let mut notifications = Vec::new();

        for admin_id in self.communities.admin_ids(community.id).await? {
            let notification = self
                .context
                .database
                .create_notification(NewNotification {
                    recipient_id: admin_id,
                    sender_id: Some(actor.id),
                    community_id: Some(community.id),
                    kind: NotificationKind::JoinRequest,
                    message: message.clone(),
                })
                .await?;

            notifications.push(notification);
        }

        info!(
            "user {} requested to join community {}",
            actor.id, community.id
        );

        Ok(notifications)
    }

    /// The actor's notifications, newest first, optionally filtered by read
    /// state. Negative limits are treated as zero.
    pub async fn list(
        &self,
        actor: &UserData,
        read_filter: Option<bool>,
        limit: i64,
    ) -> Result<Vec<NotificationData>, NotificationError> {
        Ok(self
            .context
            .database
            .list_notifications(actor.id, read_filter, limit.max(0))
            .await?)
    }

    /// Marks the notification as read without resolving it. Idempotent.
    pub async fn mark_read(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<(), NotificationError> {
        self.owned_by(actor, notification_id).await?;

        self.context
            .database
            .mark_notification_read(notification_id)
            .await?;

        Ok(())
    }

    /// Accepts a friend request, creating the friendship edge before the
    /// status flips. Accepting twice reports `AlreadyFriends` rather than
    /// failing.
    pub async fn accept_friend_request(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<AcceptOutcome, NotificationError> {
        assert_not_guest(actor, NotificationError::GuestRestricted)?;

        let notification = self.owned_by(actor, notification_id).await?;
        expect_kind(&notification, NotificationKind::FriendRequest)?;

        match notification.status {
            NotificationStatus::Accepted => return Ok(AcceptOutcome::AlreadyFriends),
            NotificationStatus::Rejected | NotificationStatus::Dismissed => {
                return Err(NotificationError::AlreadyResolved)
            }
            NotificationStatus::Pending => {}
        }

        let sender_id = notification
            .sender_id
            .ok_or(NotificationError::MissingSender)?;

        let outcome = if self.friends.check_are_friends(actor.id, sender_id).await? {
            AcceptOutcome::AlreadyFriends
        } else {
            self.context
                .database
                .create_friendship(actor.id, sender_id)
                .await?;

            AcceptOutcome::FriendAdded
        };

        self.context
            .database
            .resolve_notification(notification.id, NotificationStatus::Accepted)
            .await?;

        info!(
            "user {} accepted friend request {} ({:?})",
            actor.id, notification.id, outcome
        );

        Ok(outcome)
    }

    /// Rejects a pending friend request. An existing friendship is never
    /// removed by a rejection.
    pub async fn reject_friend_request(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<NotificationData, NotificationError> {
        assert_not_guest(actor, NotificationError::GuestRestricted)?;

        let notification = self.pending_owned_by(actor, notification_id).await?;
        expect_kind(&notification, NotificationKind::FriendRequest)?;

        Ok(self
            .context
            .database
            .resolve_notification(notification.id, NotificationStatus::Rejected)
            .await?)
    }

    /// Accepts a join request, adding the sender to the community before the
    /// status flips. Accepting twice reports `AlreadyMember` rather than
    /// failing.
    pub async fn accept_join_request(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<AcceptOutcome, NotificationError> {
        assert_not_guest(actor, NotificationError::GuestRestricted)?;

        let notification = self.owned_by(actor, notification_id).await?;
        expect_kind(&notification, NotificationKind::JoinRequest)?;

        match notification.status {
            NotificationStatus::Accepted => return Ok(AcceptOutcome::AlreadyMember),
            NotificationStatus::Rejected | NotificationStatus::Dismissed => {
                return Err(NotificationError::AlreadyResolved)
            }
            NotificationStatus::Pending => {}
        }

        let sender_id = notification
            .sender_id
            .ok_or(NotificationError::MissingSender)?;

        let community_id = notification
            .community_id
            .ok_or(NotificationError::MissingCommunity)?;

        let outcome = match self.communities.add_member(community_id, sender_id).await {
            Ok(_) => AcceptOutcome::MemberAdded,
            // Another admin got there first
            Err(CommunityError::Db(e)) if e.is_conflict() => AcceptOutcome::AlreadyMember,
            Err(e) => return Err(e.into()),
        };

        self.context
            .database
            .resolve_notification(notification.id, NotificationStatus::Accepted)
            .await?;

        info!(
            "user {} accepted join request {} ({:?})",
            actor.id, notification.id, outcome
        );

        Ok(outcome)
    }

    /// Rejects a pending join request without touching any membership.
    pub async fn reject_join_request(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<NotificationData, NotificationError> {
        assert_not_guest(actor, NotificationError::GuestRestricted)?;

        let notification = self.pending_owned_by(actor, notification_id).await?;
        expect_kind(&notification, NotificationKind::JoinRequest)?;

        Ok(self
            .context
            .database
            .resolve_notification(notification.id, NotificationStatus::Rejected)
            .await?)
    }

    /// Dismisses a message notification. Requests must be accepted or
    /// rejected instead.
    pub async fn dismiss(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<NotificationData, NotificationError> {
        let notification = self.pending_owned_by(actor, notification_id).await?;
        expect_kind(&notification, NotificationKind::Message)?;

        Ok(self
            .context
            .database
            .resolve_notification(notification.id, NotificationStatus::Dismissed)
            .await?)
    }

    async fn owned_by(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<NotificationData, NotificationError> {
        let notification = self
            .context
            .database
            .notification_by_id(notification_id)
            .await?;

        if notification.recipient_id != actor.id {
            return Err(NotificationError::NotRecipient);
        }

        Ok(notification)
    }

    async fn pending_owned_by(
        &self,
        actor: &UserData,
        notification_id: PrimaryKey,
    ) -> Result<NotificationData, NotificationError> {
        let notification = self.owned_by(actor, notification_id).await?;

        if notification.status.is_terminal() {
            return Err(NotificationError::AlreadyResolved);
        }

        Ok(notification)
    }
}

fn expect_kind(
    notification: &NotificationData,
    expected: NotificationKind,
) -> Result<(), NotificationError> {
    if notification.kind != expected {
        return Err(NotificationError::UnsupportedKind {
            kind: notification.kind.as_str(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDatabase, NewCommunityOptions, NewUser, Social};

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

    #[tokio::test]
    async fn test_friend_request_lifecycle() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        assert_eq!(request.status, NotificationStatus::Pending);
        assert!(!request.is_read);
        assert!(!social.friends.check_are_friends(a.id, b.id).await.unwrap());

        let outcome = social
            .notifications
            .accept_friend_request(&b, request.id)
            .await
            .expect("accepts");

        assert_eq!(outcome, AcceptOutcome::FriendAdded);
        assert!(social.friends.check_are_friends(a.id, b.id).await.unwrap());
        assert!(social.friends.check_are_friends(b.id, a.id).await.unwrap());

        let listed = social.notifications.list(&b, None, 50).await.unwrap();
        assert_eq!(listed[0].status, NotificationStatus::Accepted);
        assert!(listed[0].is_read, "resolving marks the notification read");
    }

    #[tokio::test]
    async fn test_reject_does_not_create_friendship() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        let rejected = social
            .notifications
            .reject_friend_request(&b, request.id)
            .await
            .expect("rejects");

        assert_eq!(rejected.status, NotificationStatus::Rejected);
        assert!(!social.friends.check_are_friends(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_accept_is_tolerated() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        social.notifications.accept_friend_request(&b, request.id).await.expect("accepts");

        let again = social
            .notifications
            .accept_friend_request(&b, request.id)
            .await
            .expect("second accept is tolerated");
        assert_eq!(again, AcceptOutcome::AlreadyFriends);

        let friends = social.friends.list_friends(b.id).await.unwrap();
        assert_eq!(friends.len(), 1, "no duplicate edges");

        // Rejecting or dismissing a resolved request still fails
        let reject = social.notifications.reject_friend_request(&b, request.id).await;
        assert!(matches!(reject, Err(NotificationError::AlreadyResolved)));
    }

    #[tokio::test]
    async fn test_rejected_request_cannot_be_accepted() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        social.notifications.reject_friend_request(&b, request.id).await.expect("rejects");

        let accept = social.notifications.accept_friend_request(&b, request.id).await;
        assert!(matches!(accept, Err(NotificationError::AlreadyResolved)));
        assert!(!social.friends.check_are_friends(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_accept_after_sender_deletion_is_not_found() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        social.database().delete_user(a.id).await.expect("deletes");

        let accept = social.notifications.accept_friend_request(&b, request.id).await;
        assert!(matches!(accept, Err(NotificationError::MissingSender)));
    }

    #[tokio::test]
    async fn test_only_recipient_may_act() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;
        let c = user(&social, "c@example.com").await;

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        let accept = social.notifications.accept_friend_request(&c, request.id).await;
        assert!(matches!(accept, Err(NotificationError::NotRecipient)));

        let read = social.notifications.mark_read(&c, request.id).await;
        assert!(matches!(read, Err(NotificationError::NotRecipient)));

        // The sender isn't the recipient either
        let accept = social.notifications.accept_friend_request(&a, request.id).await;
        assert!(matches!(accept, Err(NotificationError::NotRecipient)));
    }

    #[tokio::test]
    async fn test_crossing_requests_accept_benignly() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let to_b = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");
        let to_a = social
            .notifications
            .send_friend_request(&b, a.id, None)
            .await
            .expect("sends");

        let first = social.notifications.accept_friend_request(&b, to_b.id).await.unwrap();
        assert_eq!(first, AcceptOutcome::FriendAdded);

        let second = social.notifications.accept_friend_request(&a, to_a.id).await.unwrap();
        assert_eq!(second, AcceptOutcome::AlreadyFriends);

        let friends = social.friends.list_friends(a.id).await.unwrap();
        assert_eq!(friends.len(), 1, "no duplicate edges");
    }

    #[tokio::test]
    async fn test_request_to_existing_friend_is_rejected() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        social.friends.add_friend(&a, b.id).await.unwrap();

        let result = social.notifications.send_friend_request(&a, b.id, None).await;
        assert!(matches!(result, Err(NotificationError::AlreadyFriends)));
    }

    #[tokio::test]
    async fn test_join_request_lifecycle() {
        let social = Social::new(MemoryDatabase::new());
        let admin = user(&social, "admin@example.com").await;
        let joiner = user(&social, "joiner@example.com").await;

        let community = social
            .communities
            .create_community(
                &admin,
                NewCommunityOptions {
                    name: "Cyclists".to_string(),
                    description: None,
                    image_url: None,
                    category: None,
                    rules: None,
                },
            )
            .await
            .expect("creates");

        let requests = social
            .notifications
            .send_join_request(&joiner, community.id)
            .await
            .expect("sends");

        assert_eq!(requests.len(), 1, "one notification per admin");
        assert_eq!(requests[0].recipient_id, admin.id);

        let outcome = social
            .notifications
            .accept_join_request(&admin, requests[0].id)
            .await
            .expect("accepts");

        assert_eq!(outcome, AcceptOutcome::MemberAdded);
        assert!(social
            .communities
            .is_member(community.id, joiner.id)
            .await
            .unwrap());

        let again = social
            .notifications
            .accept_join_request(&admin, requests[0].id)
            .await
            .expect("second accept is tolerated");
        assert_eq!(again, AcceptOutcome::AlreadyMember);

        // A second request from a member is refused outright
        let again = social.notifications.send_join_request(&joiner, community.id).await;
        assert!(matches!(again, Err(NotificationError::AlreadyMember)));
    }

    #[tokio::test]
    async fn test_dismiss_applies_to_messages_only() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let message = social
            .notifications
            .send_message(&a, b.id, "hello".to_string())
            .await
            .expect("sends");

        let accept = social.notifications.accept_friend_request(&b, message.id).await;
        assert!(matches!(
            accept,
            Err(NotificationError::UnsupportedKind { .. })
        ));

        let dismissed = social
            .notifications
            .dismiss(&b, message.id)
            .await
            .expect("dismisses");
        assert_eq!(dismissed.status, NotificationStatus::Dismissed);

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        let dismiss = social.notifications.dismiss(&b, request.id).await;
        assert!(matches!(
            dismiss,
            Err(NotificationError::UnsupportedKind { .. })
        ));
    }

    #[tokio::test]
    async fn test_mark_read_does_not_resolve() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let request = social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        social
            .notifications
            .mark_read(&b, request.id)
            .await
            .expect("marks read");
        social
            .notifications
            .mark_read(&b, request.id)
            .await
            .expect("marking read twice is fine");

        let unread = social.notifications.list(&b, Some(false), 50).await.unwrap();
        assert!(unread.is_empty());

        let read = social.notifications.list(&b, Some(true), 50).await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].status, NotificationStatus::Pending, "still pending");
    }

    #[tokio::test]
    async fn test_negative_limit_lists_nothing() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        social
            .notifications
            .send_friend_request(&a, b.id, None)
            .await
            .expect("sends");

        let listed = social.notifications.list(&b, None, -5).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_guest_cannot_send_requests() {
        let social = Social::new(MemoryDatabase::new());
        let b = user(&social, "b@example.com").await;

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

        let result = social
            .notifications
            .send_friend_request(&guest, b.id, None)
            .await;
        assert!(matches!(result, Err(NotificationError::GuestRestricted)));
    }

    #[tokio::test]
    async fn test_self_request_is_rejected() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let result = social.notifications.send_friend_request(&a, a.id, None).await;
        assert!(matches!(result, Err(NotificationError::SelfRequest)));
    }
}
