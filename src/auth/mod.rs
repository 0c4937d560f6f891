pub mod middleware;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::{AppError, Result};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id
    pub username: String,
    pub exp: usize, // Expiration time
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))
    }
}

pub struct AuthService {
    jwt_secret: String,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(jwt_secret: String, session_ttl_hours: i64) -> Self {
        Self {
            jwt_secret,
            session_ttl: Duration::hours(session_ttl_hours.max(1)),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn generate_token(&self, user_id: Uuid, username: &str) -> Result<String> {
        let exp = (Utc::now() + self.session_ttl).timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: exp.max(0) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalError(format!("Failed to sign session token: {}", e)))
    }

    /// Checks signature and expiry, and that the subject is a user id.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::AuthError(format!("Invalid session token: {}", e)))?;

        claims.user_id()?;
        Ok(claims)
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::InternalError(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_identity() {
        let auth = AuthService::new("secret".to_string(), 1);
        let user_id = Uuid::new_v4();
        let token = auth.generate_token(user_id, "admin").unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let token = AuthService::new("one".to_string(), 1)
            .generate_token(Uuid::new_v4(), "admin")
            .unwrap();
        let result = AuthService::new("two".to_string(), 1).verify_token(&token);
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[test]
    fn rejects_tokens_without_a_user_id_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            username: "admin".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();

        let result = AuthService::new("secret".to_string(), 1).verify_token(&token);
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[test]
    fn verifies_hashed_passwords() {
        let auth = AuthService::new("secret".to_string(), 1);
        let hash = auth.hash_password("hunter2").unwrap();
        assert!(auth.verify_password("hunter2", &hash).unwrap());
        assert!(!auth.verify_password("hunter3", &hash).unwrap());
    }
}
