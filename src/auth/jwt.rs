use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    rbac::Principal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user_id
    pub username: String,
    pub role: String,
    pub token_use: TokenUse,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        username: String,
        role: String,
        token_use: TokenUse,
        expiration_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            username,
            role,
            token_use,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiration_seconds)).timestamp(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// Encode claims into a JWT token.
pub fn encode_token(claims: &Claims, secret: &str) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AppError::from)
}

/// Decode and validate a JWT token.
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(AppError::from)
}

/// Decode a token and require it to be of the given kind.
pub fn decode_token_of(token: &str, secret: &str, expected: TokenUse) -> AppResult<Claims> {
    let claims = decode_token(token, secret)?;
    if claims.token_use != expected {
        return Err(AppError::Unauthorized);
    }
    Ok(claims)
}
