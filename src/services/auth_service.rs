use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{decode_token_of, encode_token, verify_password, Claims, TokenUse},
    config::Config,
    error::{AppError, AppResult},
    models::User,
    rbac::Principal,
    repositories::UserRepository,
};

/// Authentication response: the signed-in user plus a token pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub id: Uuid,
    #[schema(example = "editor")]
    pub username: String,
    #[schema(example = "Editor")]
    pub role: String,
    /// JWT access token. Include in Authorization header as 'Bearer <token>' for authenticated requests.
    pub access_token: String,
    /// Longer-lived token accepted only by /api/auth/refresh.
    pub refresh_token: String,
    /// Token type, always 'Bearer' for this API
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token validity period in seconds from issue time.
    #[schema(example = 3600, minimum = 1)]
    pub expires_in: i64,
}

impl AuthResponse {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// User login credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "editor")]
    #[serde(default)]
    pub username: String,
    #[schema(example = "editor123")]
    #[serde(default)]
    pub password: String,
}

/// Refresh token exchange
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub struct AuthService;

impl AuthService {
    /// Login a user.
    pub async fn login(pool: &PgPool, input: LoginRequest, config: &Config) -> AppResult<AuthResponse> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(AppError::Validation(
                "Please provide username and password".to_string(),
            ));
        }

        // Unknown user and wrong password are indistinguishable to the caller
        let user = UserRepository::find_by_username(pool, &input.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::info!("Failed login for {}", input.username);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Self::issue(&user, config)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// The user is re-read so a deleted account cannot keep refreshing and a
    /// changed role takes effect.
    pub async fn refresh(pool: &PgPool, refresh_token: &str, config: &Config) -> AppResult<AuthResponse> {
        let claims = decode_token_of(refresh_token, &config.jwt_secret, TokenUse::Refresh)?;

        let user = UserRepository::find_by_id(pool, claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Self::issue(&user, config)
    }

    fn issue(user: &User, config: &Config) -> AppResult<AuthResponse> {
        let role = user.role.to_string();
        let access = Claims::new(
            user.id,
            user.username.clone(),
            role.clone(),
            TokenUse::Access,
            config.jwt_expiration_seconds,
        );
        let refresh = Claims::new(
            user.id,
            user.username.clone(),
            role.clone(),
            TokenUse::Refresh,
            config.jwt_refresh_expiration_seconds,
        );

        Ok(AuthResponse {
            id: user.id,
            username: user.username.clone(),
            role,
            access_token: encode_token(&access, &config.jwt_secret)?,
            refresh_token: encode_token(&refresh, &config.jwt_secret)?,
            token_type: "Bearer".to_string(),
            expires_in: config.jwt_expiration_seconds,
        })
    }
}
