use serde::Deserialize;

use super::error::ApiError;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// `?page=&page_size=` query for list endpoints. Pages start at 1.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    page: Option<i64>,
    page_size: Option<i64>,
}

impl Pagination {
    /// Convert to `(offset, limit)`.
    pub fn offset_limit(&self) -> Result<(i64, i64), ApiError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(ApiError::bad_request("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ApiError::bad_request(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| ApiError::bad_request("page is too large"))?;
        Ok((offset, page_size))
    }
}
