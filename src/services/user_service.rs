use crate::auth::AuthService;
use crate::db::repository::UserRepository;
use crate::models::User;
use crate::{AppError, Result};
use uuid::Uuid;
use std::sync::Arc;
use chrono::Utc;

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn create_user(&self, username: &str, password: &str, auth_service: &AuthService) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::ValidationError("Username and password are required".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: auth_service.hash_password(password)?,
            created_at: Utc::now(),
        };

        self.user_repo.create_user(&user).await
    }

    /// Creates the account unless a user with that name already exists.
    pub async fn ensure_user(&self, username: &str, password: &str, auth_service: &AuthService) -> Result<User> {
        match self.user_repo.get_user_by_username(username.trim()).await? {
            Some(user) => Ok(user),
            None => self.create_user(username, password, auth_service).await,
        }
    }

    /// Returns the user and a fresh session token.
    pub async fn authenticate_user(&self, username: &str, password: &str, auth_service: &AuthService) -> Result<(User, String)> {
        let user = self.user_repo.get_user_by_username(username.trim()).await?
            .ok_or_else(|| AppError::AuthError("Please enter a correct username and password".to_string()))?;

        if !auth_service.verify_password(password, &user.password_hash)? {
            return Err(AppError::AuthError("Please enter a correct username and password".to_string()));
        }

        let token = auth_service.generate_token(user.id, &user.username)?;
        Ok((user, token))
    }
}
