use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::paging::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

/// Query parameters were outside the accepted bounds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page must be at least 1, got {0}")]
    PageOutOfRange(i64),

    #[error("limit must be between 1 and {max}, got {limit}")]
    LimitOutOfRange { limit: i64, max: u32 },
}

/// Raw `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validates page/limit, applying defaults for absent values
    ///
    /// # Errors
    /// * `PageOutOfRange` - page < 1
    /// * `LimitOutOfRange` - limit < 1 or limit > 100
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, PaginationError> {
        let page = page.unwrap_or(i64::from(DEFAULT_PAGE));
        let limit = limit.unwrap_or(i64::from(DEFAULT_LIMIT));

        if page < 1 || page > i64::from(u32::MAX) {
            return Err(PaginationError::PageOutOfRange(page));
        }
        if limit < 1 || limit > i64::from(MAX_LIMIT) {
            return Err(PaginationError::LimitOutOfRange {
                limit,
                max: MAX_LIMIT,
            });
        }

        Ok(Self {
            page: page as u32,
            limit: limit as u32,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TryFrom<PageQuery> for PageRequest {
    type Error = PaginationError;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        Self::new(query.page, query.limit)
    }
}

/// Metadata block accompanying a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// A bounded slice of results plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Wraps an already-sliced result set, e.g. from a LIMIT/OFFSET query
    pub fn from_parts(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            meta: PageMeta::new(total, request),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Slices an in-memory collection into the requested page
///
/// Pages past the end yield an empty slice with accurate metadata.
///
/// # Example
/// ```
/// use esg_platform_api::domain::pagination::paginate;
///
/// let items: Vec<u32> = (1..=250).collect();
/// let page = paginate(items, Some(3), Some(50)).expect("valid page");
/// assert_eq!(page.data.first(), Some(&101));
/// assert_eq!(page.meta.total_pages, 5);
/// ```
pub fn paginate<T>(
    items: Vec<T>,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Page<T>, PaginationError> {
    let request = PageRequest::new(page, limit)?;
    Ok(paginate_with(items, request))
}

/// Slices `items` with an already validated request
pub fn paginate_with<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let data = items
        .into_iter()
        .skip(offset)
        .take(request.limit as usize)
        .collect();

    Page::from_parts(data, total, request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<u32> {
        (1..=250).collect()
    }

    #[test]
    fn third_page_of_fifty() {
        let page = paginate(items(), Some(3), Some(50)).unwrap();

        assert_eq!(page.data, (101..=150).collect::<Vec<_>>());
        assert_eq!(page.meta.total, 250);
        assert_eq!(page.meta.page, 3);
        assert_eq!(page.meta.limit, 50);
        assert_eq!(page.meta.total_pages, 5);
    }

    #[test]
    fn defaults_apply() {
        let page = paginate(items(), None, None).unwrap();
        assert_eq!(page.data.len(), 20);
        assert_eq!(page.meta.page, 1);
        assert_eq!(page.meta.total_pages, 13);
    }

    #[test]
    fn limit_above_cap_fails() {
        let result = paginate(items(), Some(1), Some(150));
        assert_eq!(
            result.unwrap_err(),
            PaginationError::LimitOutOfRange {
                limit: 150,
                max: 100
            }
        );
    }

    #[test]
    fn limit_at_cap_is_allowed() {
        assert!(paginate(items(), Some(1), Some(100)).is_ok());
    }

    #[test]
    fn page_zero_fails() {
        assert_eq!(
            paginate(items(), Some(0), None).unwrap_err(),
            PaginationError::PageOutOfRange(0)
        );
    }

    #[test]
    fn zero_limit_fails() {
        assert!(paginate(items(), Some(1), Some(0)).is_err());
    }

    #[test]
    fn page_past_end_is_empty() {
        let page = paginate(items(), Some(9), Some(50)).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total_pages, 5);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let page = paginate(Vec::<u32>::new(), None, None).unwrap();
        assert_eq!(page.meta.total, 0);
        assert_eq!(page.meta.total_pages, 0);
    }

    #[test]
    fn offset_is_computed_from_page() {
        let request = PageRequest::new(Some(4), Some(25)).unwrap();
        assert_eq!(request.offset(), 75);
    }
}
