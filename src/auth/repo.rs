use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::AppError;

const INSERT_USER_SQL: &str = r#"
    INSERT INTO users (login, password_hash)
    VALUES ($1, $2)
    RETURNING id, login, password_hash, created_at
"#;

impl User {
    /// Insert a new user with a hashed password. The unique index on `login`
    /// is the only existence check; a violation maps to [`AppError::UserAlreadyExists`].
    pub async fn create(db: &PgPool, login: &str, password_hash: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(INSERT_USER_SQL)
            .bind(login)
            .bind(password_hash)
            .fetch_one(db)
            .await
            .map_err(map_insert_error)?;
        Ok(user)
    }

    /// Find a user by login.
    pub async fn find_by_login(db: &PgPool, login: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, created_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by ID.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

/// Surfaces a duplicate login as [`AppError::UserAlreadyExists`]; anything
/// else stays a database error.
fn map_insert_error(e: sqlx::Error) -> AppError {
    if e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
    {
        AppError::UserAlreadyExists
    } else {
        AppError::Database(e)
    }
}
