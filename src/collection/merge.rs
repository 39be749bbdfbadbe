use super::page::PageResult;

/// How a freshly fetched page combines with what is already displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// The page replaces the accumulated list wholesale. Used for page 1:
    /// initial load, filter change, manual refresh.
    Replace,
    /// The page is appended after the accumulated list ("load more").
    Append,
}

impl MergeMode {
    /// Page 1 always replaces; anything later appends.
    pub fn for_page(current_page: u32) -> Self {
        if current_page <= 1 {
            MergeMode::Replace
        } else {
            MergeMode::Append
        }
    }
}

/// Combine a fetched page with the previously accumulated list.
///
/// Order is fetch order, earliest page first. No de-duplication by id is
/// attempted; the backend's cursor is trusted not to return overlapping
/// records.
pub fn merge<T>(previous: Vec<T>, page: PageResult<T>, mode: MergeMode) -> Vec<T> {
    match mode {
        MergeMode::Replace => page.items,
        MergeMode::Append => {
            let mut merged = previous;
            merged.extend(page.items);
            merged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(items: Vec<u32>, current_page: u32) -> PageResult<u32> {
        PageResult {
            items,
            current_page,
            has_next_page: false,
            total_count: 0,
        }
    }

    #[test]
    fn page_one_replaces() {
        let previous = vec![1, 2, 3];
        let merged = merge(previous, page_of(vec![7, 8], 1), MergeMode::for_page(1));
        assert_eq!(merged, vec![7, 8]);
    }

    #[test]
    fn later_pages_append_in_fetch_order() {
        let mut accumulated = merge(Vec::new(), page_of(vec![1, 2], 1), MergeMode::for_page(1));
        accumulated = merge(accumulated, page_of(vec![3], 2), MergeMode::for_page(2));
        accumulated = merge(accumulated, page_of(vec![4, 5], 3), MergeMode::for_page(3));

        assert_eq!(accumulated, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn append_length_is_additive() {
        let pages = vec![vec![1, 2, 3], vec![4], vec![5, 6]];
        let expected_len: usize = pages.iter().map(Vec::len).sum();

        let mut accumulated = Vec::new();
        for (index, items) in pages.into_iter().enumerate() {
            let page_number = index as u32 + 1;
            accumulated = merge(
                accumulated,
                page_of(items, page_number),
                MergeMode::for_page(page_number),
            );
        }
        assert_eq!(accumulated.len(), expected_len);
    }
}
