use crate::repos::Repos;
use crate::services::CredentialError;
use crate::{Config, GoogleOAuthConfig};
use callward_domain::{GoogleCredentials, ID};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

// https://developers.google.com/identity/protocols/oauth2/web-server#httprest_3

pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const CONSENT_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const REQUIRED_OAUTH_SCOPES: [&str; 1] = ["https://www.googleapis.com/auth/calendar.events"];
const OAUTH_SCOPES: [&str; 4] = [
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/calendar.events",
];

struct RefreshTokenRequest {
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    access_token: String,
    // Google only includes a new refresh token when it decides to rotate it
    #[serde(default)]
    refresh_token: Option<String>,
}

async fn refresh_access_token(
    req: RefreshTokenRequest,
    token_endpoint: &str,
) -> anyhow::Result<RefreshTokenResponse> {
    let params = [
        ("client_id", req.client_id.as_str()),
        ("client_secret", req.client_secret.as_str()),
        ("refresh_token", req.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];
    let client = reqwest::Client::new();
    let res = client.post(token_endpoint).form(&params).send().await?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("token endpoint returned {}: {}", status, body);
    }

    Ok(res.json::<RefreshTokenResponse>().await?)
}

/// A currently valid access token for the user, refreshed against the
/// token endpoint on every call and persisted before it is returned. There
/// is no expiry short-circuit: the extra network round trip buys an always
/// fresh token. A `RefreshFailed` error means the user has to go through
/// the consent flow again; callers must not retry within the same cycle.
pub async fn get_valid_access_token(
    user_id: &ID,
    repos: &Repos,
    config: &Config,
    token_endpoint: &str,
) -> Result<String, CredentialError> {
    let mut user = repos
        .users
        .find(user_id)
        .await
        .ok_or(CredentialError::UserNotFound)?;
    let credentials = user.google.clone().ok_or(CredentialError::NoCredential)?;

    let refresh_token = credentials.refresh_token.ok_or_else(|| {
        CredentialError::RefreshFailed("no refresh token stored for user".into())
    })?;
    let google_config = config.google.as_ref().ok_or_else(|| {
        CredentialError::RefreshFailed("google client is not configured".into())
    })?;

    let refresh_token_req = RefreshTokenRequest {
        client_id: google_config.client_id.clone(),
        client_secret: google_config.client_secret.clone(),
        refresh_token: refresh_token.clone(),
    };
    let tokens = refresh_access_token(refresh_token_req, token_endpoint)
        .await
        .map_err(|e| {
            warn!("Unable to refresh access token for user. Error: {:?}", e);
            CredentialError::RefreshFailed(e.to_string())
        })?;

    let access_token = tokens.access_token.clone();
    user.google = Some(GoogleCredentials {
        access_token: tokens.access_token,
        refresh_token: Some(tokens.refresh_token.unwrap_or(refresh_token)),
    });
    user.updated = Utc::now().timestamp_millis();

    // The refreshed credentials must be stored before the token is handed
    // out, otherwise a crash would leave a token Google no longer accepts
    repos.users.save(&user).await.map_err(|e| {
        CredentialError::RefreshFailed(format!("unable to persist refreshed credentials: {}", e))
    })?;

    Ok(access_token)
}

pub struct CodeTokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
    pub redirect_uri: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeTokenResponse {
    pub access_token: String,
    pub scope: String,
    pub refresh_token: Option<String>,
}

pub async fn exchange_code_token(
    req: CodeTokenRequest,
    token_endpoint: &str,
) -> anyhow::Result<CodeTokenResponse> {
    let params = [
        ("client_id", req.client_id.as_str()),
        ("client_secret", req.client_secret.as_str()),
        ("redirect_uri", req.redirect_uri.as_str()),
        ("code", req.code.as_str()),
        ("grant_type", "authorization_code"),
    ];
    let client = reqwest::Client::new();
    let res = client.post(token_endpoint).form(&params).send().await?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("token endpoint returned {}: {}", status, body);
    }

    let res = res.json::<CodeTokenResponse>().await?;

    let scopes = res.scope.split(' ').collect::<Vec<_>>();
    for required_scope in REQUIRED_OAUTH_SCOPES.iter() {
        if !scopes.contains(required_scope) {
            anyhow::bail!("missing required oauth scope: {}", required_scope);
        }
    }

    Ok(res)
}

#[derive(Debug, Deserialize)]
pub struct UserInfoResponse {
    pub email: String,
    pub name: String,
}

pub async fn fetch_user_info(access_token: &str) -> anyhow::Result<UserInfoResponse> {
    let client = reqwest::Client::new();
    let res = client
        .get(USERINFO_ENDPOINT)
        .header("authorization", format!("Bearer {}", access_token))
        .send()
        .await?;

    Ok(res.json::<UserInfoResponse>().await?)
}

/// The consent page url the user is redirected to when starting the OAuth
/// flow. Offline access with a forced consent prompt, so a refresh token
/// is always handed out.
pub fn consent_url(google_config: &GoogleOAuthConfig) -> String {
    format!(
        "{}?access_type=offline&prompt=consent&response_type=code&client_id={}&redirect_uri={}&scope={}",
        CONSENT_ENDPOINT,
        google_config.client_id,
        google_config.redirect_uri,
        OAUTH_SCOPES.join("%20"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_url_carries_offline_access_and_scopes() {
        let url = consent_url(&GoogleOAuthConfig {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:5000/auth/google/callback".into(),
        });
        assert!(url.starts_with(CONSENT_ENDPOINT));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("calendar.events"));
    }
}
