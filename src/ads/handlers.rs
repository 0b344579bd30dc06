use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::types::Decimal;
use tracing::{info, instrument, warn};

use crate::{
    ads::{
        dto::{AdvertisementResponse, CreateAdvertisementRequest, ListingFilters},
        query::ListingQuery,
        repo_types::{Advertisement, AdvertisementWithAuthor},
    },
    auth::extractors::{AuthUser, MaybeAuthUser},
    error::AppError,
    state::AppState,
};

pub const TITLE_MAX_LEN: usize = 100;
pub const CONTENT_MAX_LEN: usize = 5000;

lazy_static! {
    static ref IMAGE_URL_RE: Regex = Regex::new(r"^https?://\S+$").unwrap();
}

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/advertisements", get(list_advertisements))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/advertisements", post(create_advertisement))
}

fn validate_new_advertisement(payload: &CreateAdvertisementRequest) -> Result<(), AppError> {
    if payload.title.is_empty() || payload.title.chars().count() > TITLE_MAX_LEN {
        return Err(AppError::Validation(format!(
            "title must be 1 to {TITLE_MAX_LEN} characters"
        )));
    }
    if payload.content.is_empty() || payload.content.chars().count() > CONTENT_MAX_LEN {
        return Err(AppError::Validation(format!(
            "content must be 1 to {CONTENT_MAX_LEN} characters"
        )));
    }
    if !IMAGE_URL_RE.is_match(&payload.image_url) {
        return Err(AppError::Validation(
            "image_url must be an http or https URL".into(),
        ));
    }
    if payload.price < Decimal::ZERO {
        return Err(AppError::Validation("price must not be negative".into()));
    }
    Ok(())
}

fn decorate(
    rows: Vec<AdvertisementWithAuthor>,
    caller_login: Option<&str>,
) -> Vec<AdvertisementResponse> {
    rows.into_iter()
        .map(|row| {
            let is_mine = caller_login.map(|login| row.author_login == login);
            AdvertisementResponse {
                id: row.id,
                title: row.title,
                content: row.content,
                image_url: row.image_url,
                price: row.price,
                author_login: row.author_login,
                created_at: row.created_at,
                is_mine,
            }
        })
        .collect()
}

#[instrument(skip(state, payload))]
pub async fn create_advertisement(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateAdvertisementRequest>,
) -> Result<Json<AdvertisementResponse>, AppError> {
    if let Err(e) = validate_new_advertisement(&payload) {
        warn!(user_id = %identity.user_id, error = %e, "advertisement validation failed");
        return Err(e);
    }

    let ad = Advertisement::create(
        &state.db,
        identity.user_id,
        &payload.title,
        &payload.content,
        &payload.image_url,
        payload.price,
    )
    .await?;

    info!(ad_id = %ad.id, user_id = %identity.user_id, "advertisement created");
    Ok(Json(AdvertisementResponse {
        id: ad.id,
        title: ad.title,
        content: ad.content,
        image_url: ad.image_url,
        price: ad.price,
        author_login: identity.login,
        created_at: ad.created_at,
        is_mine: None,
    }))
}

#[instrument(skip(state))]
pub async fn list_advertisements(
    State(state): State<AppState>,
    MaybeAuthUser(identity): MaybeAuthUser,
    Query(filters): Query<ListingFilters>,
) -> Result<Json<Vec<AdvertisementResponse>>, AppError> {
    let plan = ListingQuery::from_filters(&filters)?;
    let rows = Advertisement::list(&state.db, &plan).await?;
    let caller_login = identity.as_ref().map(|i| i.login.as_str());
    Ok(Json(decorate(rows, caller_login)))
}
