use crate::client::ApiError;

/// Page sizes the backend is allowed to be asked for.
pub const ALLOWED_PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

/// Pagination position for the next batch. Most endpoints take a page
/// number; the user-management endpoint takes a skip/limit pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCursor {
    Page { page: u32, limit: u32 },
    Offset { skip: u64, limit: u32 },
}

impl PageCursor {
    pub fn page(limit: u32) -> Result<Self, ApiError> {
        validate_limit(limit)?;
        Ok(PageCursor::Page { page: 1, limit })
    }

    pub fn offset(limit: u32) -> Result<Self, ApiError> {
        validate_limit(limit)?;
        Ok(PageCursor::Offset { skip: 0, limit })
    }

    /// Rewind to the first page. Done whenever the active filters change.
    pub fn reset(&mut self) {
        match self {
            PageCursor::Page { page, .. } => *page = 1,
            PageCursor::Offset { skip, .. } => *skip = 0,
        }
    }

    /// The cursor for the page after this one.
    pub fn advanced(&self) -> Self {
        match *self {
            PageCursor::Page { page, limit } => PageCursor::Page {
                page: page + 1,
                limit,
            },
            PageCursor::Offset { skip, limit } => PageCursor::Offset {
                skip: skip + u64::from(limit),
                limit,
            },
        }
    }

    /// One-based page number this cursor addresses.
    pub fn current_page(&self) -> u32 {
        match *self {
            PageCursor::Page { page, .. } => page,
            PageCursor::Offset { skip, limit } => (skip / u64::from(limit)) as u32 + 1,
        }
    }

    pub fn limit(&self) -> u32 {
        match *self {
            PageCursor::Page { limit, .. } | PageCursor::Offset { limit, .. } => limit,
        }
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match *self {
            PageCursor::Page { page, limit } => vec![
                ("page".to_string(), page.to_string()),
                ("limit".to_string(), limit.to_string()),
            ],
            PageCursor::Offset { skip, limit } => vec![
                ("skip".to_string(), skip.to_string()),
                ("limit".to_string(), limit.to_string()),
            ],
        }
    }
}

fn validate_limit(limit: u32) -> Result<(), ApiError> {
    if ALLOWED_PAGE_SIZES.contains(&limit) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Page size {} is not allowed; pick one of {:?}",
            limit, ALLOWED_PAGE_SIZES
        )))
    }
}

/// One fetched page of a collection, already normalized from whatever
/// pagination shape the endpoint used.
#[derive(Debug, Clone)]
pub struct PageResult<T> {
    /// Always present, possibly empty. Never `null` on the wire either;
    /// parsers default a missing array to empty.
    pub items: Vec<T>,
    pub current_page: u32,
    /// Reported by the backend, never inferred from `items.len()`.
    pub has_next_page: bool,
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unlisted_page_sizes() {
        assert!(PageCursor::page(50).is_ok());
        assert!(matches!(
            PageCursor::page(37),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            PageCursor::offset(0),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn page_cursor_advances_and_resets() {
        let mut cursor = PageCursor::page(25).unwrap();
        assert_eq!(cursor.current_page(), 1);

        cursor = cursor.advanced();
        cursor = cursor.advanced();
        assert_eq!(cursor.current_page(), 3);

        cursor.reset();
        assert_eq!(cursor.current_page(), 1);
    }

    #[test]
    fn offset_cursor_maps_to_page_numbers() {
        let mut cursor = PageCursor::offset(10).unwrap();
        assert_eq!(cursor.current_page(), 1);
        assert_eq!(
            cursor.query_pairs(),
            vec![
                ("skip".to_string(), "0".to_string()),
                ("limit".to_string(), "10".to_string())
            ]
        );

        cursor = cursor.advanced();
        assert_eq!(cursor.current_page(), 2);
        assert_eq!(cursor.query_pairs()[0].1, "10");
    }
}
