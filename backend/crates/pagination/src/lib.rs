//! Page and limit primitives for list endpoints.
//!
//! Clients address a result set with a 1-based `page` and a `limit`.
//! [`PageRequest`] validates those inputs and turns them into an SQL-friendly
//! offset, and [`PageInfo`] describes where a returned page sits in the whole
//! result set.
//!
//! ```
//! use pagination::PageRequest;
//!
//! let request = PageRequest::new(3, 10).expect("valid page request");
//! assert_eq!(request.offset(), 20);
//!
//! let info = request.info(25);
//! assert_eq!(info.total_pages, 3);
//! assert!(!info.has_next_page);
//! assert!(info.has_prev_page);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page used when the client omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while validating page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// The requested page size falls outside `1..=MAX_LIMIT`.
    #[error("limit must be between 1 and {max}, got {limit}")]
    LimitOutOfRange {
        /// Requested page size.
        limit: u32,
        /// Largest accepted page size.
        max: u32,
    },
}

/// Validated page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest", into = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate explicit page coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::ZeroPage`] when `page` is zero and
    /// [`PageRequestError::LimitOutOfRange`] when `limit` is zero or exceeds
    /// [`MAX_LIMIT`].
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// Validate optional query parameters, applying the defaults for any
    /// value the client left out.
    ///
    /// # Errors
    ///
    /// See [`PageRequest::new`].
    pub fn from_optional(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Describe this page within a result set of `total_items` rows.
    #[must_use]
    pub const fn info(&self, total_items: u64) -> PageInfo {
        let total_pages = total_items.div_ceil(self.limit as u64);
        PageInfo {
            current_page: self.page,
            total_pages,
            total_items,
            has_next_page: (self.page as u64) < total_pages,
            has_prev_page: self.page > 1,
        }
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

#[derive(Serialize, Deserialize)]
struct RawPageRequest {
    page: u32,
    limit: u32,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.page, value.limit)
    }
}

impl From<PageRequest> for RawPageRequest {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
        }
    }
}

/// Position of a returned page within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The 1-based page that was returned.
    pub current_page: u32,
    /// Number of pages needed to cover every item.
    pub total_pages: u64,
    /// Number of items matching the query across all pages.
    pub total_items: u64,
    /// Whether a later page exists.
    pub has_next_page: bool,
    /// Whether an earlier page exists.
    pub has_prev_page: bool,
}

/// A page of items together with its [`PageInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in query order.
    pub items: Vec<T>,
    /// Position of this page in the result set.
    pub info: PageInfo,
}

impl<T> Page<T> {
    /// Assemble a page from already-fetched items and the full result count.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            info: request.info(total_items),
        }
    }

    /// Transform each item while keeping the page position.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
