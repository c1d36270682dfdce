//! Page arithmetic for search responses.

use serde::Serialize;

/// Current page and page count derived from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based current page.
    pub page: u64,
    /// Total pages; `1` when everything fits on one page.
    pub pages: u64,
    /// Results per page, never 0.
    pub per_page: u64,
}

impl Pagination {
    /// Compute pagination from the response's `start`, `num-results-requested`
    /// and `result-count`.
    ///
    /// A requested size of 0 treats the whole result set as a single page.
    pub fn calculate(start: u64, num_results_requested: u32, result_count: u64) -> Self {
        if num_results_requested == 0 {
            return Self {
                page: 1,
                pages: 1,
                per_page: result_count.max(1),
            };
        }

        let per_page = u64::from(num_results_requested);
        let pages = if per_page < result_count {
            result_count.div_ceil(per_page)
        } else {
            1
        };

        Self {
            page: start / per_page + 1,
            pages,
            per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_of_three_pages() {
        let p = Pagination::calculate(20, 20, 45);
        assert_eq!(p.page, 2);
        assert_eq!(p.pages, 3);
        assert_eq!(p.per_page, 20);
    }

    #[test]
    fn test_exact_multiple() {
        let p = Pagination::calculate(0, 20, 40);
        assert_eq!((p.page, p.pages), (1, 2));
    }

    #[test]
    fn test_single_page_sentinel() {
        assert_eq!(Pagination::calculate(0, 20, 20).pages, 1);
        assert_eq!(Pagination::calculate(0, 20, 3).pages, 1);
        assert_eq!(Pagination::calculate(0, 20, 0).pages, 1);
    }

    #[test]
    fn test_zero_requested_is_one_page() {
        let p = Pagination::calculate(40, 0, 45);
        assert_eq!((p.page, p.pages, p.per_page), (1, 1, 45));
        assert_eq!(Pagination::calculate(0, 0, 0).per_page, 1);
    }

    #[test]
    fn test_start_mid_page_rounds_down() {
        assert_eq!(Pagination::calculate(39, 20, 100).page, 2);
    }
}
