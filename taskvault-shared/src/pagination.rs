/// Page/limit normalization for list endpoints
///
/// Query values are accepted as raw strings: anything missing, non-numeric
/// or non-positive falls back to page 1 / limit 10.

use serde::Deserialize;

/// Default page number
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size
pub const DEFAULT_LIMIT: i64 = 10;

/// Raw `?page=&limit=` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Normalized page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Builds a window from already-parsed values
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page <= 0 { DEFAULT_PAGE } else { page };
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };

        Self {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}

impl From<&PageQuery> for Page {
    fn from(query: &PageQuery) -> Self {
        let parse = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|value| value.trim().parse::<i64>().ok())
                .unwrap_or(0)
        };

        Page::new(parse(&query.page), parse(&query.limit))
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}
