use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const MAX_PER_PAGE: i64 = 100;

/// Query parameters for paginated list endpoints
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[param(minimum = 1, default = 1, example = 1)]
    #[serde(default = "default_page")]
    pub page: i64,

    /// Number of items per page
    #[param(minimum = 1, maximum = 100, default = 20, example = 20)]
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Get the clamped limit value (1-100)
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Calculate the SQL OFFSET value. Saturates instead of overflowing for huge pages.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn meta(&self, total_items: i64) -> PaginationMeta {
        PaginationMeta::new(self.page(), self.limit(), total_items)
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number
    #[schema(example = 1, minimum = 1)]
    pub page: i64,

    /// Items per page
    #[schema(example = 20, minimum = 1, maximum = 100)]
    pub per_page: i64,

    /// Total number of items across all pages
    #[schema(example = 156)]
    pub total_items: i64,

    /// Total number of pages
    #[schema(example = 8)]
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: i64, per_page: i64, total_items: i64) -> Self {
        let total_pages = (total_items + per_page - 1) / per_page;
        Self {
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let params = PaginationParams {
            page: 3,
            per_page: 10,
        };
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 0);

        let params = PaginationParams {
            page: 2,
            per_page: 0,
        };
        assert_eq!(params.limit(), 1);
        assert_eq!(params.offset(), 1);
    }

    #[test]
    fn test_huge_page_saturates() {
        let params = PaginationParams {
            page: i64::MAX,
            per_page: 100,
        };
        assert_eq!(params.offset(), i64::MAX);

        let params = PaginationParams {
            page: i64::MAX,
            per_page: 1,
        };
        assert_eq!(params.offset(), i64::MAX - 1);
    }

    #[test]
    fn test_meta_total_pages() {
        let params = PaginationParams::default();
        assert_eq!(params.meta(0).total_pages, 0);
        assert_eq!(params.meta(20).total_pages, 1);
        assert_eq!(params.meta(21).total_pages, 2);
    }
}
