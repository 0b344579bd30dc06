use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for publishing an advertisement.
#[derive(Debug, Deserialize)]
pub struct CreateAdvertisementRequest {
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub price: Decimal,
}

/// Query-string filters accepted by the listing feed.
#[derive(Debug, Deserialize)]
pub struct ListingFilters {
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_type: Option<String>,
    pub sort_order: Option<String>,
}

fn default_page_number() -> i64 { 1 }
fn default_page_size() -> i64 { 20 }

/// Listing view returned to clients. `is_mine` is present only when the
/// request carried a verified identity.
#[derive(Debug, Serialize)]
pub struct AdvertisementResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub price: Decimal,
    pub author_login: String,
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mine: Option<bool>,
}
