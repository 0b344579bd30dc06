use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Advertisement record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Advertisement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub price: sqlx::types::Decimal,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Listing row joined with the author's login at read time.
#[derive(Debug, Clone, FromRow)]
pub struct AdvertisementWithAuthor {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub price: sqlx::types::Decimal,
    pub author_login: String,
    pub created_at: OffsetDateTime,
}
