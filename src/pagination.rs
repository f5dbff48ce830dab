//! Page-by-page browsing of the last product listing fetched for a chat.

use crate::warehouse_model::Product;

/// Direction requested by the "Next page" / "Previous page" buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Next,
    Previous,
}

/// The last product listing fetched for a chat and its current page.
///
/// Never empty: an empty listing has no valid page, so `new` refuses it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListCache {
    products: Vec<Product>,
    page: usize,
    page_size: usize,
}

impl ProductListCache {
    /// Returns `None` for an empty listing. A zero page size is treated as one.
    pub fn new(products: Vec<Product>, page_size: usize) -> Option<Self> {
        if products.is_empty() {
            return None;
        }
        Some(Self {
            products,
            page: 0,
            page_size: page_size.max(1),
        })
    }

    /// `ceil(len / page_size)`, at least 1
    pub fn total_pages(&self) -> usize {
        self.products.len().div_ceil(self.page_size)
    }

    /// Zero-based index of the current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_products(&self) -> usize {
        self.products.len()
    }

    /// Products on the current page
    pub fn page_items(&self) -> &[Product] {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.products.len());
        &self.products[start..end]
    }

    /// Moves one page in `direction`, staying put at either end.
    /// Returns whether the page changed.
    pub fn turn(&mut self, direction: PageDirection) -> bool {
        let last = self.total_pages() - 1;
        let target = match direction {
            PageDirection::Next => (self.page + 1).min(last),
            PageDirection::Previous => self.page.saturating_sub(1),
        };
        let moved = target != self.page;
        self.page = target;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products(count: usize) -> Vec<Product> {
        (0..count)
            .map(|i| Product {
                id: Some(i as i64 + 1),
                name: format!("Product {}", i + 1),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_empty_listing_is_not_cached() {
        assert!(ProductListCache::new(Vec::new(), 10).is_none());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(ProductListCache::new(products(1), 10).unwrap().total_pages(), 1);
        assert_eq!(ProductListCache::new(products(10), 10).unwrap().total_pages(), 1);
        assert_eq!(ProductListCache::new(products(11), 10).unwrap().total_pages(), 2);
        assert_eq!(ProductListCache::new(products(25), 10).unwrap().total_pages(), 3);
        assert_eq!(ProductListCache::new(products(3), 0).unwrap().total_pages(), 3);
    }

    #[test]
    fn test_next_stops_at_last_page() {
        let mut cache = ProductListCache::new(products(25), 10).unwrap();
        assert!(cache.turn(PageDirection::Next));
        assert!(cache.turn(PageDirection::Next));
        assert_eq!(cache.page(), 2);
        assert_eq!(cache.page_items().len(), 5);

        assert!(!cache.turn(PageDirection::Next));
        assert_eq!(cache.page(), 2);
    }

    #[test]
    fn test_previous_stops_at_first_page() {
        let mut cache = ProductListCache::new(products(25), 10).unwrap();
        assert!(!cache.turn(PageDirection::Previous));
        assert_eq!(cache.page(), 0);
        assert_eq!(cache.page_items()[0].id, Some(1));
    }

    #[test]
    fn test_page_index_always_in_range() {
        for count in 1..=23 {
            for size in 1..=7 {
                let mut cache = ProductListCache::new(products(count), size).unwrap();
                for step in 0..12 {
                    let direction = if step % 3 == 2 {
                        PageDirection::Previous
                    } else {
                        PageDirection::Next
                    };
                    cache.turn(direction);
                    assert!(cache.page() < cache.total_pages());
                    assert!(!cache.page_items().is_empty());
                }
            }
        }
    }
}
