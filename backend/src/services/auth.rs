//! Authentication service for signup, login and sessions

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use serde::Deserialize;
use shared::{SessionUser, User};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::NewUser;
use crate::store::{SessionStore, UserStore};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hash_cost: u32,
}

/// Input for creating an account
#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    #[serde(alias = "firstName")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[serde(alias = "lastName")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default, alias = "farmLocation")]
    pub farm_location: Option<String>,
    #[serde(default, alias = "farmSize")]
    pub farm_size: Option<String>,
}

/// Login credentials
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// An opened session
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub token: String,
    pub user: SessionUser,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            users,
            sessions,
            hash_cost: DEFAULT_COST,
        }
    }

    /// Use a different bcrypt cost
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Register a new account and open a session for it
    pub async fn signup(&self, mut input: SignupInput) -> AppResult<(User, SessionGrant)> {
        input.first_name = input.first_name.trim().to_string();
        input.last_name = input.last_name.trim().to_string();
        input.email = normalize_email(&input.email);
        input.validate()?;

        if self.users.email_exists(&input.email).await? {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        // Hash password
        let password_hash = hash(&input.password, self.hash_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = self
            .users
            .create(&NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
                farm_location: non_blank(input.farm_location),
                farm_size: non_blank(input.farm_size),
            })
            .await?;

        tracing::info!("Registered user {}", user.id);

        let grant = self.open_session(SessionUser::from(&user)).await?;
        Ok((user, grant))
    }

    /// Authenticate user with email and password
    pub async fn login(&self, mut input: LoginInput) -> AppResult<SessionGrant> {
        input.email = normalize_email(&input.email);
        input.validate()?;

        let row = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Verify password
        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = User::from(row);
        self.open_session(SessionUser::from(&user)).await
    }

    /// Revoke the session behind a token, if any
    pub async fn logout(&self, token: Option<&str>) -> AppResult<()> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.sessions.revoke(token).await?;
        }
        Ok(())
    }

    /// Identity behind a token. Store failures are logged and read as no session.
    pub async fn current_user(&self, token: Option<&str>) -> Option<SessionUser> {
        let token = token.filter(|t| !t.is_empty())?;
        match self.sessions.resolve(token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Session lookup failed: {}", e);
                None
            }
        }
    }

    async fn open_session(&self, user: SessionUser) -> AppResult<SessionGrant> {
        let token = self.sessions.create(&user).await?;
        Ok(SessionGrant { token, user })
    }
}
