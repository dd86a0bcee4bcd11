//! Account persistence

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserRow, USER_COLUMNS};

const UNIQUE_VIOLATION: &str = "23505";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    async fn create(&self, user: &NewUser) -> AppResult<User>;

    /// Account with its password hash, for credential checks
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, farm_location, farm_size)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.farm_location)
            .bind(&user.farm_size)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                // Lost a race with a concurrent signup for the same email
                let duplicate = e
                    .as_database_error()
                    .and_then(|db| db.code())
                    .map_or(false, |code| code == UNIQUE_VIOLATION);
                if duplicate {
                    AppError::DuplicateEntry("email".to_string())
                } else {
                    AppError::DatabaseError(e)
                }
            })?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }
}
