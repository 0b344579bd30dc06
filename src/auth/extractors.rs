use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{error::AppError, state::AppState};

/// The caller a verified bearer token speaks for.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub login: String,
}

/// Extracts and validates the bearer token, rejecting the request otherwise.
#[derive(Debug)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::InvalidToken)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::InvalidToken)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token)?;

        Ok(AuthUser(Identity {
            user_id: claims.sub,
            login: claims.login,
        }))
    }
}

/// Same resolution as [`AuthUser`], but absent or unverifiable credentials
/// yield `None` instead of a rejection.
pub struct MaybeAuthUser(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = AuthUser::from_request_parts(parts, state)
            .await
            .ok()
            .map(|AuthUser(identity)| identity);
        Ok(MaybeAuthUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Request};
    use uuid::Uuid;

    use super::*;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = builder.body(()).expect("request should build");
        let (parts, _) = request.into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("extraction should fail");
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("extraction should fail");
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn valid_bearer_token_resolves_identity() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "carol").expect("signing should succeed");

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AuthUser(identity) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extraction should succeed");
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.login, "carol");
    }

    #[tokio::test]
    async fn optional_identity_is_none_without_header() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let MaybeAuthUser(identity) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("optional extraction never fails");
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn optional_identity_ignores_garbage_token() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer not-a-jwt"));
        let MaybeAuthUser(identity) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("optional extraction never fails");
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn optional_identity_resolves_valid_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys
            .sign(Uuid::new_v4(), "dave")
            .expect("signing should succeed");

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let MaybeAuthUser(identity) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("optional extraction never fails");
        assert_eq!(identity.expect("identity should resolve").login, "dave");
    }
}
