//! Group and user directory models
//!
//! Groups are named subsets of users. Users are directory entries used for
//! labelling balances; they play no part in the math.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::ids::{GroupId, UserId};

/// A named set of users sharing expenses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            members: members.into_iter().collect(),
            created_at: Utc::now(),
        }
    }

    /// Check membership
    pub fn contains(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// Add a member; returns `false` if already present
    pub fn add_member(&mut self, user: UserId) -> bool {
        self.members.insert(user)
    }

    /// Validate the group
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Group name cannot be empty".into());
        }
        if self.members.is_empty() {
            return Err("A group needs at least one member".into());
        }
        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} members)", self.name, self.members.len())
    }
}

/// A user directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub friends: BTreeSet<UserId>,
}

impl User {
    /// Create a new user
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: String::new(),
            friends: BTreeSet::new(),
        }
    }

    /// Set the email (builder style)
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Validate the user
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("User name cannot be empty".into());
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(format!("Invalid email address: '{}'", self.email));
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
