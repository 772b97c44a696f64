//! Page counts and the five-button page window.

use std::fmt;
use std::ops::RangeInclusive;

/// Number of page buttons shown at once.
pub const WINDOW_SIZE: u32 = 5;

/// Total pages for `total_found` results at `per_page` each; never less than 1.
#[must_use]
pub fn total_pages(total_found: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total_found.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page numbers to show as buttons.
///
/// All pages when there are at most five; otherwise the first five while
/// `current <= 3`, the last five while `current >= total - 2`, and
/// `current - 2 ..= current + 2` in between.
#[must_use]
pub fn page_window(current: u32, total: u32) -> RangeInclusive<u32> {
    if total <= WINDOW_SIZE {
        1..=total
    } else if current <= 3 {
        1..=WINDOW_SIZE
    } else if current >= total - 2 {
        (total - WINDOW_SIZE + 1)..=total
    } else {
        (current - 2)..=(current + 2)
    }
}

/// Current position within a paginated result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Current page (1-based).
    pub page: u32,
    /// Total pages (at least 1).
    pub total_pages: u32,
}

impl PageInfo {
    /// Create page info; `page` and `total_pages` are floored at 1.
    #[must_use]
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self { page: page.max(1), total_pages: total_pages.max(1) }
    }

    /// Page buttons to show.
    #[must_use]
    pub fn window(&self) -> RangeInclusive<u32> {
        page_window(self.page, self.total_pages)
    }

    /// Check if `page` is a valid target.
    #[must_use]
    pub const fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// Previous page, if any.
    #[must_use]
    pub const fn prev(&self) -> Option<u32> {
        if self.page > 1 { Some(self.page - 1) } else { None }
    }

    /// Next page, if any.
    #[must_use]
    pub const fn next(&self) -> Option<u32> {
        if self.page < self.total_pages { Some(self.page + 1) } else { None }
    }
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page {} of {}", self.page, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(current: u32, total: u32) -> Vec<u32> {
        page_window(current, total).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(47, 10), 5);
    }

    #[test]
    fn test_window_twelve_pages() {
        assert_eq!(window(1, 12), vec![1, 2, 3, 4, 5]);
        assert_eq!(window(7, 12), vec![5, 6, 7, 8, 9]);
        assert_eq!(window(11, 12), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_window_boundaries() {
        assert_eq!(window(3, 12), vec![1, 2, 3, 4, 5]);
        assert_eq!(window(4, 12), vec![2, 3, 4, 5, 6]);
        assert_eq!(window(9, 12), vec![7, 8, 9, 10, 11]);
        assert_eq!(window(10, 12), vec![8, 9, 10, 11, 12]);
        assert_eq!(window(2, 3), vec![1, 2, 3]);
        assert_eq!(window(4, 6), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_page_info_navigation() {
        let info = PageInfo::new(1, 5);
        assert_eq!(info.to_string(), "Page 1 of 5");
        assert_eq!(info.prev(), None);
        assert_eq!(info.next(), Some(2));
        assert!(info.contains(5));
        assert!(!info.contains(0));
        assert!(!info.contains(6));
    }
}
