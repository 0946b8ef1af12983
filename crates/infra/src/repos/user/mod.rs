mod inmemory;

use callward_domain::{User, ID};
pub use inmemory::InMemoryUserRepo;

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn delete(&self, user_id: &ID) -> Option<User>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_by_email(&self, email: &str) -> Option<User>;
}

#[cfg(test)]
mod tests {
    use crate::setup_context_inmemory;
    use callward_domain::{GoogleCredentials, User};

    #[tokio::test]
    async fn saves_updated_credentials() {
        let ctx = setup_context_inmemory();

        let mut user = User::new("ada@example.com".into(), "Ada".into(), 0);
        ctx.repos.users.insert(&user).await.expect("To insert user");

        assert!(ctx
            .repos
            .users
            .find(&user.id)
            .await
            .expect("To find user")
            .google
            .is_none());

        user.google = Some(GoogleCredentials {
            access_token: "fresh-token".into(),
            refresh_token: Some("refresh".into()),
        });
        ctx.repos.users.save(&user).await.expect("To save user");

        let stored = ctx.repos.users.find(&user.id).await.expect("To find user");
        assert_eq!(
            stored.google.expect("Credentials present").access_token,
            "fresh-token"
        );
    }

    #[tokio::test]
    async fn finds_user_by_email() {
        let ctx = setup_context_inmemory();

        let user = User::new("grace@example.com".into(), "Grace".into(), 0);
        ctx.repos.users.insert(&user).await.expect("To insert user");

        let found = ctx
            .repos
            .users
            .find_by_email("grace@example.com")
            .await
            .expect("To find user");
        assert_eq!(found.id, user.id);
        assert!(ctx.repos.users.find_by_email("nobody@example.com").await.is_none());
    }
}
