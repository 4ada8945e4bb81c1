use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::EnvironmentConfig;
use crate::models::{User, UserRole};
use crate::utils::errors::AppError;

/// Subject used in admin tokens; the admin has no row in `users`
pub const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and validates HS256 bearer tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    user_token_duration: Duration,
    admin_token_duration: Duration,
}

impl JwtService {
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            user_token_duration: Duration::seconds(config.jwt_expiration as i64),
            admin_token_duration: Duration::seconds(config.admin_jwt_expiration as i64),
        }
    }

    pub fn issue_user_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id.to_string(),
            phone: Some(user.phone.clone()),
            username: None,
            role: user.role,
            exp: (now + self.user_token_duration).timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    pub fn issue_admin_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: ADMIN_SUBJECT.to_string(),
            phone: None,
            username: Some(username.to_string()),
            role: UserRole::Admin,
            exp: (now + self.admin_token_duration).timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &JwtClaims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating token: {}", e)))
    }

    /// Decode a token, rejecting bad signatures and expired tokens.
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))
    }
}
