use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::ads::query::ListingQuery;
use crate::ads::repo_types::{Advertisement, AdvertisementWithAuthor};
use crate::error::AppError;

impl Advertisement {
    /// Insert a new advertisement owned by `user_id`.
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        content: &str,
        image_url: &str,
        price: sqlx::types::Decimal,
    ) -> Result<Advertisement, AppError> {
        let ad = sqlx::query_as::<_, Advertisement>(
            r#"
            INSERT INTO advertisements (title, content, image_url, price, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, content, image_url, price, user_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(image_url)
        .bind(price)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(ad)
    }

    /// Execute a validated listing plan.
    pub async fn list(
        db: &PgPool,
        plan: &ListingQuery,
    ) -> Result<Vec<AdvertisementWithAuthor>, AppError> {
        let mut qb = listing_query(plan);
        let rows = qb
            .build_query_as::<AdvertisementWithAuthor>()
            .fetch_all(db)
            .await?;
        Ok(rows)
    }
}

/// Build the listing SELECT. Filter values go through `push_bind`; the only
/// text spliced in comes from the closed sort enums.
fn listing_query(plan: &ListingQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT a.id, a.title, a.content, a.image_url, a.price, u.login AS author_login, a.created_at \
         FROM advertisements a JOIN users u ON u.id = a.user_id WHERE true",
    );
    if let Some(min) = plan.min_price {
        qb.push(" AND a.price >= ").push_bind(min);
    }
    if let Some(max) = plan.max_price {
        qb.push(" AND a.price <= ").push_bind(max);
    }
    // No secondary tie-break column: rows with equal sort keys come back in
    // whatever order the store picks.
    qb.push(" ORDER BY ")
        .push(plan.sort_key.column())
        .push(" ")
        .push(plan.sort_order.sql());
    qb.push(" LIMIT ").push_bind(plan.limit);
    qb.push(" OFFSET ").push_bind(plan.offset);
    qb
}

#[cfg(test)]
mod tests {
    use crate::ads::query::{SortKey, SortOrder};

    use super::*;

    fn base_plan() -> ListingQuery {
        ListingQuery {
            limit: 20,
            offset: 0,
            min_price: None,
            max_price: None,
            sort_key: SortKey::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }

    #[test]
    fn bare_plan_keeps_the_where_clause_trivial() {
        let sql = listing_query(&base_plan()).into_sql();
        assert!(sql.contains("WHERE true ORDER BY a.created_at DESC"));
        assert!(sql.contains("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn price_bounds_are_bound_parameters() {
        let plan = ListingQuery {
            min_price: Some("10.00".parse().unwrap()),
            max_price: Some("50.00".parse().unwrap()),
            ..base_plan()
        };
        let sql = listing_query(&plan).into_sql();
        assert!(sql.contains("AND a.price >= $1"));
        assert!(sql.contains("AND a.price <= $2"));
        assert!(sql.contains("LIMIT $3 OFFSET $4"));
        // Values never appear in the query text itself.
        assert!(!sql.contains("10"));
        assert!(!sql.contains("50"));
    }

    #[test]
    fn sort_spec_resolves_to_fixed_fragments() {
        let plan = ListingQuery {
            sort_key: SortKey::Price,
            sort_order: SortOrder::Asc,
            ..base_plan()
        };
        assert!(listing_query(&plan).into_sql().contains("ORDER BY a.price ASC"));
    }
}
