//! User and group directory collections
//!
//! Persisted to `users.json` and `groups.json`.

use super::repository::{Record, Repository};
use crate::error::SplitError;
use crate::models::{Group, GroupId, User, UserId};

pub type UserRepository = Repository<User>;
pub type GroupRepository = Repository<Group>;

impl Record for User {
    type Id = UserId;
    type SortKey = String;
    const KEY: &'static str = "users.json";
    const COLLECTION: &'static str = "users";

    fn id(&self) -> UserId {
        self.id
    }

    fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl Record for Group {
    type Id = GroupId;
    type SortKey = String;
    const KEY: &'static str = "groups.json";
    const COLLECTION: &'static str = "groups";

    fn id(&self) -> GroupId {
        self.id
    }

    fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl Repository<User> {
    /// Find a user by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<User>, SplitError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .find_all(|u| u.name.to_lowercase() == name_lower)?
            .into_iter()
            .next())
    }
}

impl Repository<Group> {
    /// Find a group by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Group>, SplitError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .find_all(|g| g.name.to_lowercase() == name_lower)?
            .into_iter()
            .next())
    }

    /// Groups a user belongs to
    pub fn get_for_member(&self, user: UserId) -> Result<Vec<Group>, SplitError> {
        self.find_all(|g| g.contains(user))
    }
}
