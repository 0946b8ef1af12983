use crate::error::CallwardError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{http::header, web, HttpResponse};
use callward_api_structs::google_callback;
use callward_domain::{GoogleCredentials, User};
use callward_infra::google_calendar::auth_provider::{self, CodeTokenRequest};
use callward_infra::Context;

/// Starts the consent flow by sending the browser to Google's consent page
pub async fn google_auth_controller(
    ctx: web::Data<Context>,
) -> Result<HttpResponse, CallwardError> {
    let google_config = ctx.config.google.as_ref().ok_or_else(|| {
        CallwardError::Conflict("Google integration is not configured on this server".into())
    })?;

    Ok(HttpResponse::Found()
        .insert_header((
            header::LOCATION,
            auth_provider::consent_url(google_config),
        ))
        .finish())
}

pub async fn google_callback_controller(
    query: web::Query<google_callback::QueryParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, CallwardError> {
    let code = query
        .into_inner()
        .code
        .ok_or_else(|| CallwardError::BadClientData("Authorization code is required".into()))?;

    let usecase = GoogleOAuthCallbackUseCase { code };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(google_callback::APIResponse {
                message: "Logged in".into(),
                user_id: res.user.id.clone(),
                email: res.user.email.clone(),
                name: res.user.name,
            })
        })
        .map_err(CallwardError::from)
}

/// Finishes the consent flow: exchanges the authorization code for tokens,
/// resolves the Google profile and upserts the user with fresh credentials.
#[derive(Debug)]
pub struct GoogleOAuthCallbackUseCase {
    pub code: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub user: User,
}

#[derive(Debug)]
pub enum UseCaseError {
    IntegrationNotConfigured,
    OAuthFailed,
    StorageError,
}

impl From<UseCaseError> for CallwardError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::IntegrationNotConfigured => {
                Self::Conflict("Google integration is not configured on this server".into())
            }
            UseCaseError::OAuthFailed => Self::BadClientData(
                "Bad client data made the oauth process fail. Make sure the code and redirect_uri is correct".into(),
            ),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GoogleOAuthCallbackUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "GoogleOAuthCallback";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let google_config = ctx
            .config
            .google
            .as_ref()
            .ok_or(UseCaseError::IntegrationNotConfigured)?;

        let req = CodeTokenRequest {
            client_id: google_config.client_id.clone(),
            client_secret: google_config.client_secret.clone(),
            redirect_uri: google_config.redirect_uri.clone(),
            code: self.code.clone(),
        };
        let tokens = auth_provider::exchange_code_token(req, auth_provider::TOKEN_ENDPOINT)
            .await
            .map_err(|_| UseCaseError::OAuthFailed)?;

        let profile = auth_provider::fetch_user_info(&tokens.access_token)
            .await
            .map_err(|_| UseCaseError::OAuthFailed)?;

        let credentials = GoogleCredentials {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        };
        let now = ctx.sys.get_timestamp_millis();

        let user = match ctx.repos.users.find_by_email(&profile.email).await {
            Some(mut user) => {
                // Keep an earlier refresh token when Google does not hand
                // out a new one
                let refresh_token = credentials.refresh_token.or_else(|| {
                    user.google
                        .as_ref()
                        .and_then(|g| g.refresh_token.clone())
                });
                user.google = Some(GoogleCredentials {
                    access_token: credentials.access_token,
                    refresh_token,
                });
                user.updated = now;
                ctx.repos
                    .users
                    .save(&user)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
                user
            }
            None => {
                let mut user = User::new(profile.email, profile.name, now);
                user.google = Some(credentials);
                ctx.repos
                    .users
                    .insert(&user)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
                user
            }
        };

        Ok(UseCaseRes { user })
    }
}
