use std::str::FromStr;

use sqlx::types::Decimal;

use crate::ads::dto::ListingFilters;
use crate::error::AppError;

pub const PAGE_SIZE_MAX: i64 = 100;

/// Columns the listing feed may be ordered by. Requests naming anything
/// else are rejected before a query is built; the SQL fragment is always
/// one of these fixed strings, never caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    CreatedAt,
}

impl SortKey {
    pub fn column(self) -> &'static str {
        match self {
            SortKey::Price => "a.price",
            SortKey::CreatedAt => "a.created_at",
        }
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortKey::Price),
            "created_at" => Ok(SortKey::CreatedAt),
            other => Err(AppError::InvalidSortSpec(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::InvalidSortSpec(other.to_string())),
        }
    }
}

/// A validated listing query plan. Only values that passed the checks in
/// [`ListingQuery::from_filters`] end up here.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub limit: i64,
    pub offset: i64,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl ListingQuery {
    pub fn from_filters(filters: &ListingFilters) -> Result<Self, AppError> {
        if filters.page_number < 1 {
            return Err(AppError::Validation("page_number must be at least 1".into()));
        }
        if filters.page_size < 1 || filters.page_size > PAGE_SIZE_MAX {
            return Err(AppError::Validation(format!(
                "page_size must be between 1 and {PAGE_SIZE_MAX}"
            )));
        }
        for bound in [filters.min_price, filters.max_price].into_iter().flatten() {
            if bound < Decimal::ZERO {
                return Err(AppError::Validation(
                    "price bounds must not be negative".into(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
            if min > max {
                return Err(AppError::Validation(
                    "min_price must not exceed max_price".into(),
                ));
            }
        }

        let sort_key = match filters.sort_type.as_deref() {
            Some(s) => s.parse()?,
            None => SortKey::CreatedAt,
        };
        let sort_order = match filters.sort_order.as_deref() {
            Some(s) => s.parse()?,
            None => SortOrder::Desc,
        };

        Ok(ListingQuery {
            limit: filters.page_size,
            offset: (filters.page_number - 1).saturating_mul(filters.page_size),
            min_price: filters.min_price,
            max_price: filters.max_price,
            sort_key,
            sort_order,
        })
    }
}
