use log::info;
use thiserror::Error;

use crate::{
    util::assert_not_guest, CommunityData, CommunityMemberData, CommunityRole, Database,
    DatabaseError, NewCommunityMember, PrimaryKey, SocialContext, UpdatedCommunity, UserData,
};

/// Manages communities and their memberships.
///
/// Every community has at least one admin from the moment it exists, because
/// creation inserts the creator's admin membership in the same transaction as
/// the community row.
pub struct Communities<Db> {
    context: SocialContext<Db>,
}

#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("Guests must register before joining communities")]
    GuestRestricted,
    #[error("Only community admins may do this")]
    NotAdmin,
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// Fields accepted when creating a community
#[derive(Debug)]
pub struct NewCommunityOptions {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub rules: Option<String>,
}

impl<Db> Communities<Db>
where
    Db: Database,
{
    pub fn new(context: &SocialContext<Db>) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Creates a community with the actor as its first admin.
    pub async fn create_community(
        &self,
        actor: &UserData,
        options: NewCommunityOptions,
    ) -> Result<CommunityData, CommunityError> {
        assert_not_guest(actor, CommunityError::GuestRestricted)?;

        let community = self
            .context
            .database
            .create_community(crate::NewCommunity {
                name: options.name,
                description: options.description,
                image_url: options.image_url,
                category: options.category,
                rules: options.rules,
                owner_id: actor.id,
            })
            .await?;

        info!(
            "user {} created community {} ({})",
            actor.id, community.id, community.name
        );

        Ok(community)
    }

    pub async fn community(&self, community_id: PrimaryKey) -> Result<CommunityData, CommunityError> {
        Ok(self.context.database.community_by_id(community_id).await?)
    }

    /// Applies a partial update. Only admins of the community may do this.
    pub async fn update_community(
        &self,
        actor: &UserData,
        update: UpdatedCommunity,
    ) -> Result<CommunityData, CommunityError> {
        self.assert_admin(update.id, actor).await?;

        Ok(self.context.database.update_community(update).await?)
    }

    /// Deletes the community along with its memberships and notifications.
    pub async fn delete_community(
        &self,
        actor: &UserData,
        community_id: PrimaryKey,
    ) -> Result<(), CommunityError> {
        self.assert_admin(community_id, actor).await?;

        self.context.database.delete_community(community_id).await?;
        info!("user {} deleted community {}", actor.id, community_id);

        Ok(())
    }

    /// Members of the community, with their user profiles. Guests may browse
    /// communities but not their member lists.
    pub async fn list_members(
        &self,
        actor: &UserData,
        community_id: PrimaryKey,
    ) -> Result<Vec<CommunityMemberData>, CommunityError> {
        assert_not_guest(actor, CommunityError::GuestRestricted)?;

        // Distinguishes an unknown community from an empty one
        self.context.database.community_by_id(community_id).await?;

        Ok(self
            .context
            .database
            .list_community_members(community_id)
            .await?)
    }

    /// Joins the actor to the community as a regular member.
    pub async fn join(
        &self,
        actor: &UserData,
        community_id: PrimaryKey,
    ) -> Result<CommunityMemberData, CommunityError> {
        assert_not_guest(actor, CommunityError::GuestRestricted)?;

        self.add_member(community_id, actor.id).await
    }

    /// Adds the user as a regular member. Fails with a conflict if the user
    /// is already in the community.
    pub async fn add_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<CommunityMemberData, CommunityError> {
        self.context.database.community_by_id(community_id).await?;
        let user = self.context.database.user_by_id(user_id).await?;

        let member = self
            .context
            .database
            .create_community_member(NewCommunityMember {
                community_id,
                user_id: user.id,
                role: CommunityRole::Member,
            })
            .await?;

        Ok(member)
    }

    /// A user may remove themselves, and admins may remove anyone.
    pub async fn remove_member(
        &self,
        actor: &UserData,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<(), CommunityError> {
        assert_not_guest(actor, CommunityError::GuestRestricted)?;

        if actor.id != user_id {
            self.assert_admin(community_id, actor).await?;
        }

        // Surfaces NotFound when the user is not a member
        self.context
            .database
            .community_member(community_id, user_id)
            .await?;

        self.context
            .database
            .delete_community_member(community_id, user_id)
            .await?;

        Ok(())
    }

    pub async fn member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<CommunityMemberData, CommunityError> {
        Ok(self
            .context
            .database
            .community_member(community_id, user_id)
            .await?)
    }

    pub async fn is_member(
        &self,
        community_id: PrimaryKey,
        user_id: PrimaryKey,
    ) -> Result<bool, CommunityError> {
        match self
            .context
            .database
            .community_member(community_id, user_id)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Ids of users holding the admin role in the community.
    pub async fn admin_ids(&self, community_id: PrimaryKey) -> Result<Vec<PrimaryKey>, CommunityError> {
        let members = self
            .context
            .database
            .list_community_members(community_id)
            .await?;

        Ok(members
            .into_iter()
            .filter(|m| m.role == CommunityRole::Admin)
            .map(|m| m.user.id)
            .collect())
    }

    async fn assert_admin(
        &self,
        community_id: PrimaryKey,
        actor: &UserData,
    ) -> Result<(), CommunityError> {
        assert_not_guest(actor, CommunityError::GuestRestricted)?;

        let member = self
            .context
            .database
            .community_member(community_id, actor.id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    CommunityError::NotAdmin
                } else {
                    e.into()
                }
            })?;

        if member.role != CommunityRole::Admin {
            return Err(CommunityError::NotAdmin);
        }

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

    fn options(name: &str) -> NewCommunityOptions {
        NewCommunityOptions {
            name: name.to_string(),
            description: None,
            image_url: None,
            category: None,
            rules: None,
        }
    }

    #[tokio::test]
    async fn test_creator_becomes_admin() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let community = social
            .communities
            .create_community(&a, options("Cyclists"))
            .await
            .expect("creates");

        let members = social
            .communities
            .list_members(&a, community.id)
            .await
            .expect("lists");

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user.id, a.id);
        assert_eq!(members[0].role, CommunityRole::Admin);
    }

    #[tokio::test]
    async fn test_duplicate_member_conflicts() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let community = social
            .communities
            .create_community(&a, options("Cyclists"))
            .await
            .expect("creates");

        social
            .communities
            .add_member(community.id, b.id)
            .await
            .expect("joins");

        let result = social.communities.add_member(community.id, b.id).await;
        assert!(matches!(
            result,
            Err(CommunityError::Db(DatabaseError::Conflict { .. }))
        ));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_update() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;

        let community = social
            .communities
            .create_community(&a, options("Cyclists"))
            .await
            .expect("creates");

        social
            .communities
            .add_member(community.id, b.id)
            .await
            .expect("joins");

        let result = social
            .communities
            .update_community(
                &b,
                UpdatedCommunity {
                    id: community.id,
                    name: Some("Taken over".to_string()),
                    description: None,
                    image_url: None,
                    category: None,
                    rules: None,
                    is_active: None,
                },
            )
            .await;

        assert!(matches!(result, Err(CommunityError::NotAdmin)));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let community = social
            .communities
            .create_community(
                &a,
                NewCommunityOptions {
                    description: Some("For people who ride".to_string()),
                    ..options("Cyclists")
                },
            )
            .await
            .expect("creates");

        let updated = social
            .communities
            .update_community(
                &a,
                UpdatedCommunity {
                    id: community.id,
                    name: Some("Road cyclists".to_string()),
                    description: None,
                    image_url: None,
                    category: None,
                    rules: None,
                    is_active: None,
                },
            )
            .await
            .expect("updates");

        assert_eq!(updated.name, "Road cyclists");
        assert_eq!(updated.description.as_deref(), Some("For people who ride"));
        assert!(updated.is_active);
    }

    #[tokio::test]
    async fn test_member_can_leave_but_not_remove_others() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;
        let b = user(&social, "b@example.com").await;
        let c = user(&social, "c@example.com").await;

        let community = social
            .communities
            .create_community(&a, options("Cyclists"))
            .await
            .expect("creates");

        social.communities.add_member(community.id, b.id).await.unwrap();
        social.communities.add_member(community.id, c.id).await.unwrap();

        let result = social
            .communities
            .remove_member(&b, community.id, c.id)
            .await;
        assert!(matches!(result, Err(CommunityError::NotAdmin)));

        social
            .communities
            .remove_member(&b, community.id, b.id)
            .await
            .expect("leaves");

        assert!(!social
            .communities
            .is_member(community.id, b.id)
            .await
            .unwrap());

        // Admins may remove anyone
        social
            .communities
            .remove_member(&a, community.id, c.id)
            .await
            .expect("admin removes");
    }

    #[tokio::test]
    async fn test_unknown_community_is_not_found() {
        let social = Social::new(MemoryDatabase::new());
        let a = user(&social, "a@example.com").await;

        let result = social.communities.list_members(&a, 999).await;
        assert!(matches!(
            result,
            Err(CommunityError::Db(DatabaseError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_guest_cannot_join_or_list_members() {
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

        let community = social
            .communities
            .create_community(&a, options("Cyclists"))
            .await
            .expect("creates");

        let join = social.communities.join(&guest, community.id).await;
        assert!(matches!(join, Err(CommunityError::GuestRestricted)));

        let members = social.communities.list_members(&guest, community.id).await;
        assert!(matches!(members, Err(CommunityError::GuestRestricted)));
    }
}
