//! Offset pagination over post listings.

use serde::Serialize;

/// Pagination summary for a single listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_posts: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// One page of items plus the listing-wide summary.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

/// Slice `items` into the requested 1-based page.
///
/// The current page clamps into the valid range; an empty listing reports
/// page 1 of 0 pages with no neighbours either side.
pub fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1);
    let total_posts = items.len() as u32;
    let total_pages = total_posts.div_ceil(per_page);
    let current_page = page.min(total_pages).max(1);

    let start = ((current_page - 1) * per_page) as usize;
    let end = (start + per_page as usize).min(items.len());
    let page_items = if start < items.len() {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: page_items,
        info: PageInfo {
            current_page,
            total_pages,
            total_posts,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        },
    }
}
