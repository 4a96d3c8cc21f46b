//! User directory and bearer-token identity resolution.
//!
//! The directory is the server's boundary to the identity collaborator:
//! it maps opaque bearer tokens to authenticated user ids and serves the
//! read-only user projections embedded in task responses. Entries are
//! seeded from configuration and immutable for the lifetime of the
//! process; token issuance (login, registration) is out of scope.

use std::collections::HashMap;

use taskhub_core::user::{User, UserId, UserProjection};

/// A directory entry paired with the bearer token that authenticates it.
#[derive(Debug, Clone)]
pub struct SeedUser {
    /// The directory user.
    pub user: User,
    /// Opaque bearer credential for this user.
    pub token: String,
}

/// Immutable in-memory user directory.
pub struct UserDirectory {
    users: Vec<User>,
    tokens: HashMap<String, UserId>,
}

impl UserDirectory {
    /// Builds a directory from seeded users.
    ///
    /// A duplicate token keeps the first binding and drops the rest.
    #[must_use]
    pub fn new(seed: Vec<SeedUser>) -> Self {
        let mut users = Vec::with_capacity(seed.len());
        let mut tokens = HashMap::with_capacity(seed.len());
        for entry in seed {
            tokens.entry(entry.token).or_insert(entry.user.id);
            users.push(entry.user);
        }
        Self { users, tokens }
    }

    /// Resolves a bearer token to a user id.
    #[must_use]
    pub fn resolve_token(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).copied()
    }

    /// Resolves a user reference to its display projection.
    ///
    /// Returns `None` for dangling references; the caller embeds `null`
    /// instead of failing the whole response.
    #[must_use]
    pub fn projection(&self, user_id: UserId) -> Option<UserProjection> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .map(User::projection)
    }

    /// Lists every user as a projection, for assignee pickers.
    #[must_use]
    pub fn list(&self) -> Vec<UserProjection> {
        self.users.iter().map(User::projection).collect()
    }

    /// Case-insensitive substring search over name and email.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<UserProjection> {
        let needle = query.to_lowercase();
        self.users
            .iter()
            .filter(|user| {
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .map(User::projection)
            .collect()
    }
}
