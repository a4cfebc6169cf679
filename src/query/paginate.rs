//! Slicing the ordered result list into the requested page.

use std::ops::Range;

/// Upper bound on page size, matching the upstream gallery.
pub const MAX_PAGE_SIZE: i32 = 1000;

/// Index range of a page over `len` items.
///
/// `page_number` is 1-based; anything below 1 means the first page.
/// `page_size` is clamped to `[1, MAX_PAGE_SIZE]`.
pub fn page_range(len: usize, page_number: i32, page_size: i32) -> Range<usize> {
    let page = i64::from(page_number).saturating_sub(1).max(0) as u64;
    let size = page_size.clamp(1, MAX_PAGE_SIZE) as u64;

    let start = page.saturating_mul(size);
    if start >= len as u64 {
        return len..len;
    }
    let start = start as usize;
    let end = start.saturating_add(size as usize).min(len);
    start..end
}

/// The requested page of `items`.
pub fn paginate<T>(mut items: Vec<T>, page_number: i32, page_size: i32) -> Vec<T> {
    let range = page_range(items.len(), page_number, page_size);
    items.drain(range).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five() -> Vec<u32> {
        vec![0, 1, 2, 3, 4]
    }

    #[test]
    fn pages_over_five_items() {
        assert_eq!(paginate(five(), 1, 2), vec![0, 1]);
        assert_eq!(paginate(five(), 2, 2), vec![2, 3]);
        assert_eq!(paginate(five(), 3, 2), vec![4]);
        assert!(paginate(five(), 10, 2).is_empty());
    }

    #[test]
    fn page_number_below_one_is_first_page() {
        assert_eq!(paginate(five(), 0, 2), vec![0, 1]);
        assert_eq!(paginate(five(), -7, 2), vec![0, 1]);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(paginate(five(), 1, 0), vec![0]);
        assert_eq!(paginate(five(), 2, -3), vec![1]);
        assert_eq!(page_range(5000, 1, 50_000), 0..1000);
        assert_eq!(page_range(5000, 2, 1001), 1000..2000);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        assert_eq!(page_range(5, i32::MAX, MAX_PAGE_SIZE), 5..5);
        assert!(paginate(Vec::<u8>::new(), 1, 10).is_empty());
    }
}
