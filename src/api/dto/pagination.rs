//! Pagination and listing query parameters.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::{LinkQuery, LinkSort};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters of `GET /api/links`.
///
/// Uses `serde_with` to parse numbers from query strings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub sort: Option<LinkSort>,

    #[serde(default)]
    pub search: Option<String>,
}

impl ListParams {
    /// Validates the parameters and scopes them to `user_id`.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `limit`: 20
    /// - `sort`: `created_at`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page` is 0 or `limit` is outside 1-100.
    pub fn into_query(self, user_id: i64) -> Result<LinkQuery, AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::bad_request(
                format!("Limit must be between 1 and {}", MAX_PAGE_SIZE),
                json!({ "limit": limit }),
            ));
        }

        Ok(LinkQuery {
            user_id,
            page: page as i64,
            limit: limit as i64,
            sort: self.sort.unwrap_or_default(),
            search: self.search,
        })
    }
}

/// Pagination block of list responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            current_page: page,
            per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, limit: Option<u32>) -> ListParams {
        ListParams {
            page,
            limit,
            ..ListParams::default()
        }
    }

    #[test]
    fn test_defaults() {
        let query = params(None, None).into_query(7).unwrap();
        assert_eq!(query.user_id, 7);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert_eq!(query.sort, LinkSort::CreatedAt);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_custom_page_and_limit() {
        let query = params(Some(3), Some(50)).into_query(1).unwrap();
        assert_eq!(query.offset(), 100);
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn test_bounds() {
        assert!(params(Some(0), None).into_query(1).is_err());
        assert!(params(None, Some(0)).into_query(1).is_err());
        assert!(params(None, Some(101)).into_query(1).is_err());
        assert!(params(None, Some(1)).into_query(1).is_ok());
        assert!(params(None, Some(100)).into_query(1).is_ok());
    }

    #[test]
    fn test_sort_from_query_string() {
        let p: ListParams =
            serde_json::from_str(r#"{"page": "2", "sort": "click_count"}"#).unwrap();
        assert_eq!(p.page, Some(2));
        assert_eq!(p.sort, Some(LinkSort::ClickCount));

        assert!(serde_json::from_str::<ListParams>(r#"{"sort": "random"}"#).is_err());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(PaginationMeta::new(1, 20, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 20, 20).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 20, 21).total_pages, 2);
    }
}
