//! User and group directory service
//!
//! The directory labels balances and scopes group views. It never takes
//! part in balance arithmetic.

use tracing::info;

use super::identifier_matches;
use crate::error::{SplitError, SplitResult};
use crate::models::{Group, GroupId, User, UserId};
use crate::storage::LedgerRepository;

/// Service for users, friendships and groups
pub struct DirectoryService<'a> {
    ledger: &'a LedgerRepository,
}

impl<'a> DirectoryService<'a> {
    pub fn new(ledger: &'a LedgerRepository) -> Self {
        Self { ledger }
    }

    /// Register a user
    pub fn add_user(&self, name: &str, email: Option<&str>) -> SplitResult<User> {
        let name = name.trim();
        if self.ledger.users.get_by_name(name)?.is_some() {
            return Err(SplitError::Duplicate {
                entity_type: "User",
                identifier: name.to_string(),
            });
        }

        let mut user = User::new(name);
        if let Some(email) = email {
            user = user.with_email(email.trim());
        }
        user.validate().map_err(SplitError::Validation)?;

        self.ledger.users.upsert(user.clone())?;
        info!(user = %user.id, "user added");
        Ok(user)
    }

    pub fn list_users(&self) -> SplitResult<Vec<User>> {
        self.ledger.users.get_all()
    }

    /// Find a user by name, full id or id prefix
    pub fn find_user(&self, identifier: &str) -> SplitResult<Option<User>> {
        if let Some(user) = self.ledger.users.get_by_name(identifier)? {
            return Ok(Some(user));
        }
        if let Ok(id) = identifier.parse::<UserId>() {
            return self.ledger.users.get(id);
        }
        Ok(self
            .ledger
            .users
            .find_all(|u| identifier_matches(u.id.as_uuid(), "usr-", identifier))?
            .into_iter()
            .next())
    }

    /// Like `find_user`, but a missing user is an error
    pub fn resolve_user(&self, identifier: &str) -> SplitResult<User> {
        self.find_user(identifier)?
            .ok_or_else(|| SplitError::user_not_found(identifier))
    }

    /// Make two users friends of each other
    pub fn befriend(&self, a: UserId, b: UserId) -> SplitResult<()> {
        if a == b {
            return Err(SplitError::Validation(
                "A user cannot befriend themselves".into(),
            ));
        }

        let mut first = self
            .ledger
            .users
            .get(a)?
            .ok_or_else(|| SplitError::user_not_found(a.to_string()))?;
        let mut second = self
            .ledger
            .users
            .get(b)?
            .ok_or_else(|| SplitError::user_not_found(b.to_string()))?;

        first.friends.insert(b);
        second.friends.insert(a);
        self.ledger.users.upsert(first)?;
        self.ledger.users.upsert(second)?;
        Ok(())
    }

    /// Friends of a user from the directory
    pub fn friends_of(&self, user: UserId) -> SplitResult<Vec<UserId>> {
        Ok(self
            .ledger
            .users
            .get(user)?
            .map(|u| u.friends.into_iter().collect())
            .unwrap_or_default())
    }

    /// Display name of a user, falling back to the id
    pub fn label(&self, user: UserId) -> String {
        match self.ledger.users.get(user) {
            Ok(Some(u)) => u.name,
            _ => user.to_string(),
        }
    }

    /// Create a group
    pub fn create_group(&self, name: &str, members: Vec<UserId>) -> SplitResult<Group> {
        let name = name.trim();
        if self.ledger.groups.get_by_name(name)?.is_some() {
            return Err(SplitError::Duplicate {
                entity_type: "Group",
                identifier: name.to_string(),
            });
        }
        for member in &members {
            self.require_user(*member)?;
        }

        let group = Group::new(name, members);
        group.validate().map_err(SplitError::Validation)?;

        self.ledger.groups.upsert(group.clone())?;
        info!(group = %group.id, members = group.members.len(), "group created");
        Ok(group)
    }

    /// Add a member to a group
    pub fn add_member(&self, group_id: GroupId, user: UserId) -> SplitResult<Group> {
        self.require_user(user)?;
        let mut group = self
            .ledger
            .groups
            .get(group_id)?
            .ok_or_else(|| SplitError::group_not_found(group_id.to_string()))?;

        if !group.add_member(user) {
            return Err(SplitError::Duplicate {
                entity_type: "Group member",
                identifier: user.to_string(),
            });
        }
        self.ledger.groups.upsert(group.clone())?;
        Ok(group)
    }

    pub fn list_groups(&self) -> SplitResult<Vec<Group>> {
        self.ledger.groups.get_all()
    }

    /// Find a group by name, full id or id prefix
    pub fn find_group(&self, identifier: &str) -> SplitResult<Option<Group>> {
        if let Some(group) = self.ledger.groups.get_by_name(identifier)? {
            return Ok(Some(group));
        }
        if let Ok(id) = identifier.parse::<GroupId>() {
            return self.ledger.groups.get(id);
        }
        Ok(self
            .ledger
            .groups
            .find_all(|g| identifier_matches(g.id.as_uuid(), "grp-", identifier))?
            .into_iter()
            .next())
    }

    pub fn resolve_group(&self, identifier: &str) -> SplitResult<Group> {
        self.find_group(identifier)?
            .ok_or_else(|| SplitError::group_not_found(identifier))
    }

    fn require_user(&self, user: UserId) -> SplitResult<()> {
        if self.ledger.users.exists(user)? {
            Ok(())
        } else {
            Err(SplitError::user_not_found(user.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find_user() {
        let ledger = LedgerRepository::in_memory();
        let service = DirectoryService::new(&ledger);

        let alice = service.add_user("Alice", Some("alice@example.com")).unwrap();
        assert_eq!(service.resolve_user("alice").unwrap(), alice);
        assert_eq!(
            service.resolve_user(&alice.id.to_string()).unwrap(),
            alice
        );
        assert!(service.resolve_user("nobody").unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_user_name() {
        let ledger = LedgerRepository::in_memory();
        let service = DirectoryService::new(&ledger);

        service.add_user("Alice", None).unwrap();
        assert!(matches!(
            service.add_user("ALICE", None),
            Err(SplitError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_befriend_is_mutual() {
        let ledger = LedgerRepository::in_memory();
        let service = DirectoryService::new(&ledger);
        let alice = service.add_user("Alice", None).unwrap();
        let bob = service.add_user("Bob", None).unwrap();

        service.befriend(alice.id, bob.id).unwrap();
        assert_eq!(service.friends_of(alice.id).unwrap(), vec![bob.id]);
        assert_eq!(service.friends_of(bob.id).unwrap(), vec![alice.id]);
        assert!(service.befriend(alice.id, alice.id).unwrap_err().is_validation());
    }

    #[test]
    fn test_group_membership() {
        let ledger = LedgerRepository::in_memory();
        let service = DirectoryService::new(&ledger);
        let alice = service.add_user("Alice", None).unwrap();
        let bob = service.add_user("Bob", None).unwrap();

        let group = service.create_group("Flat", vec![alice.id]).unwrap();
        let group = service.add_member(group.id, bob.id).unwrap();
        assert!(group.contains(bob.id));
        assert!(service.add_member(group.id, bob.id).is_err());
        assert_eq!(service.resolve_group("flat").unwrap().members.len(), 2);
    }

    #[test]
    fn test_group_with_unknown_member() {
        let ledger = LedgerRepository::in_memory();
        let service = DirectoryService::new(&ledger);

        let err = service.create_group("Flat", vec![UserId::new()]).unwrap_err();
        assert!(err.is_not_found());
    }
}
