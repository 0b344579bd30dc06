use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{self, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN},
        repo_types::User,
    },
    error::AppError,
    state::AppState,
};

lazy_static! {
    static ref LOGIN_RE: Regex = Regex::new(r"^[a-zA-Z0-9]{3,32}$").unwrap();
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

fn validate_new_credentials(login: &str, password: &str) -> Result<(), AppError> {
    if !LOGIN_RE.is_match(login) {
        return Err(AppError::Validation(
            "login must be 3 to 32 alphanumeric characters".into(),
        ));
    }
    let password_len = password.chars().count();
    if password_len < PASSWORD_MIN_LEN || password_len > PASSWORD_MAX_LEN {
        return Err(AppError::Validation(format!(
            "password must be {PASSWORD_MIN_LEN} to {PASSWORD_MAX_LEN} characters"
        )));
    }
    if !password::meets_policy(password) {
        return Err(AppError::Validation(
            "password must contain an uppercase letter, a lowercase letter, a digit, and a special character"
                .into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, AppError> {
    if let Err(e) = validate_new_credentials(&payload.login, &payload.password) {
        warn!(login = %payload.login, error = %e, "register validation failed");
        return Err(e);
    }

    // Hashing is CPU-bound; keep it off the request workers.
    let password = payload.password;
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&password)).await??;

    // No existence pre-check; the unique index on login decides races.
    let user = User::create(&state.db, &payload.login, &hash).await?;

    info!(user_id = %user.id, login = %user.login, "user registered");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = match User::find_by_login(&state.db, &payload.login).await? {
        Some(user) => user,
        None => {
            warn!(login = %payload.login, "login attempt for unknown login");
            return Err(AppError::InvalidCredentials);
        }
    };

    let password = payload.password;
    let stored_hash = user.password_hash.clone();
    let matched =
        tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
            .await?;
    if !matched {
        warn!(login = %user.login, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.login)?;

    info!(user_id = %user.id, login = %user.login, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::find_by_id(&state.db, identity.user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %identity.user_id, "token subject no longer exists");
            AppError::UserNotFound
        })?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn validation_message(login: &str, password: &str) -> String {
        match validate_new_credentials(login, password) {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_compliant_credentials() {
        assert!(validate_new_credentials("alice42", "Secur3P@ssw0rd!").is_ok());
        assert!(validate_new_credentials("abc", "Xy1!Xy1!").is_ok());
    }

    #[test]
    fn rejects_bad_logins() {
        let msg = validation_message("ab", "Secur3P@ssw0rd!");
        assert!(msg.contains("login"));

        let too_long = "a".repeat(33);
        assert!(validation_message(&too_long, "Secur3P@ssw0rd!").contains("login"));
        assert!(validation_message("has-dash", "Secur3P@ssw0rd!").contains("login"));
        assert!(validation_message("has space", "Secur3P@ssw0rd!").contains("login"));
        assert!(validation_message("", "Secur3P@ssw0rd!").contains("login"));
    }

    #[test]
    fn rejects_out_of_bounds_password_lengths() {
        assert!(validation_message("alice42", "Xy1!Xy1").contains("8 to 64"));
        let long_tail = "a".repeat(61);
        assert!(validation_message("alice42", &format!("Xy1!{long_tail}")).contains("8 to 64"));
    }

    #[test]
    fn measures_password_length_in_characters_not_bytes() {
        // 7 characters, 8 bytes in UTF-8.
        assert!(validation_message("alice42", "Aé$1abc").contains("8 to 64"));

        // 64 characters, well past 64 bytes.
        let accented = format!("Xy1!{}", "é".repeat(60));
        assert!(validate_new_credentials("alice42", &accented).is_ok());
    }

    #[test]
    fn rejects_weak_passwords() {
        let msg = validation_message("alice42", "alllowercase1!");
        assert!(msg.contains("uppercase"));
        assert!(validation_message("alice42", "NoDigitsHere!").contains("digit"));
    }
}
