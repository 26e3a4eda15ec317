/// One page of a longer listing, 1-based like the `$history` command
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// Slice `all` into the requested page. Page 0 is treated as page 1 and
    /// a page past the end yields no items.
    pub fn from_slice(all: &[T], page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let current_page = page.max(1);
        let total_pages = all.len().div_ceil(per_page);

        let start = (current_page - 1).saturating_mul(per_page);
        let items = all.iter().skip(start).take(per_page).cloned().collect();

        Page {
            items,
            current_page,
            total_pages,
        }
    }
}

impl<T> Page<T> {
    pub fn is_first(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let all: Vec<u32> = (1..=25).collect();
        let page = Page::from_slice(&all, 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(!page.is_first());
        assert!(!page.is_last());
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let all = vec!["a", "b"];
        let page = Page::from_slice(&all, 5, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(page.is_last());
    }
}
