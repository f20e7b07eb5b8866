use std::sync::Arc;

mod auth;
mod communities;
mod db;
mod engagement;
mod friends;
mod notifications;
mod util;

pub use auth::*;
pub use communities::*;
pub use db::*;
pub use engagement::*;
pub use friends::*;
pub use notifications::*;
pub use util::random_string;

/// The social layer of wishlane. One instance owns all managers, which share
/// a database handle through [`SocialContext`].
pub struct Social<Db> {
    context: SocialContext<Db>,

    pub auth: Auth<Db>,
    pub friends: Friends<Db>,
    pub notifications: Notifications<Db>,
    pub communities: Communities<Db>,
    pub engagement: Engagement<Db>,
}

/// A struct that holds shared state, to be used by the managers
pub struct SocialContext<Db> {
    pub database: Arc<Db>,
}

impl<Db> Social<Db>
where
    Db: Database,
{
    pub fn new(database: Db) -> Self {
        let context = SocialContext {
            database: Arc::new(database),
        };

        Self {
            auth: Auth::new(&context),
            friends: Friends::new(&context),
            notifications: Notifications::new(&context),
            communities: Communities::new(&context),
            engagement: Engagement::new(&context),
            context,
        }
    }

    pub fn database(&self) -> &Db {
        &self.context.database
    }
}

// Implemented manually, since derive adds unnecessary bounds on Db
impl<Db> Clone for SocialContext<Db> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
        }
    }
}
