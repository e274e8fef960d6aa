// ABOUTME: User accounts and the in-memory user store
// ABOUTME: Email addresses are unique case-insensitively; lookups by email or id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::messages::USER_ALREADY_EXISTS;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user id
    pub id: Uuid,
    /// Login email, stored as registered
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a fresh id
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Public view of the user
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// User fields safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user id
    pub id: Uuid,
    /// Login email
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

/// In-memory user store keyed by lowercased email
#[derive(Debug, Default)]
pub struct UserStore {
    by_email: DashMap<String, User>,
    email_by_id: DashMap<Uuid, String>,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the email is taken
    pub fn create(&self, user: User) -> AppResult<()> {
        match self.by_email.entry(email_key(&user.email)) {
            Entry::Occupied(_) => Err(AppError::already_exists(USER_ALREADY_EXISTS)),
            Entry::Vacant(slot) => {
                self.email_by_id.insert(user.id, slot.key().clone());
                slot.insert(user);
                Ok(())
            }
        }
    }

    /// Look up a user by email, ignoring case
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.by_email
            .get(&email_key(email))
            .map(|entry| entry.value().clone())
    }

    /// Look up a user by id
    #[must_use]
    pub fn find_by_id(&self, id: Uuid) -> Option<User> {
        let email = self.email_by_id.get(&id)?.value().clone();
        self.find_by_email(&email)
    }

    /// Number of registered users
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    /// Whether no user is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}
