use crate::shared::entity::{Entity, ID};

/// Tokens obtained when a `User` completes the Google OAuth consent flow.
/// The access token is replaced on every refresh, the refresh token only
/// when Google decides to rotate it.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: ID,
    /// Unique within the user repository
    pub email: String,
    pub name: String,
    /// Only set for users created through local signup, not through OAuth
    pub password_hash: Option<String>,
    /// `None` until the user has completed the OAuth consent flow
    pub google: Option<GoogleCredentials>,
    pub created: i64,
    pub updated: i64,
}

impl User {
    pub fn new(email: String, name: String, now: i64) -> Self {
        Self {
            id: Default::default(),
            email,
            name,
            password_hash: None,
            google: None,
            created: now,
            updated: now,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
