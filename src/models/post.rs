//! Blog post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - Input types for creating and updating posts
//! - `PostFilter` - the combined predicate applied to list queries
//! - `Visibility` - which publish states a caller may observe
//! - Pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short summary shown in listings
    pub excerpt: String,
    /// Full body content
    pub content: String,
    /// Cover image URL
    pub cover_image: String,
    /// Whether the post is featured on the landing page
    pub featured: bool,
    /// Whether the post is publicly visible
    pub published: bool,
    /// Publication timestamp, set once on first publish
    pub published_at: Option<DateTime<Utc>>,
    /// Estimated read time label, e.g. "5 min read"
    pub read_time: String,
    /// View count (best-effort)
    #[serde(default)]
    pub views: i64,
    /// Author ID
    pub author_id: i64,
    /// Category ID
    pub category_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published: bool,
    /// Explicit publication timestamp; when absent and `published` is true,
    /// the current time is used
    pub published_at: Option<DateTime<Utc>>,
    pub read_time: String,
    pub author_id: i64,
    pub category_id: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Input for updating an existing post; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostInput {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
    pub read_time: Option<String>,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Which publish states a caller may observe.
///
/// Anonymous visitors only ever see published posts; authenticated console
/// callers see drafts as well. The filter layer forces the published
/// predicate for `Public` regardless of any other query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Published posts only
    Public,
    /// All posts, drafts included
    Admin,
}

impl Visibility {
    /// Derive visibility from an authentication check
    pub fn from_admin(is_admin: bool) -> Self {
        if is_admin {
            Visibility::Admin
        } else {
            Visibility::Public
        }
    }

    /// Whether unpublished posts are included
    pub fn includes_drafts(&self) -> bool {
        matches!(self, Visibility::Admin)
    }
}

/// Combined predicate for post list queries.
///
/// All conditions are ANDed together; `None` fields are no-op filters.
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// Publish-state restriction derived from caller identity
    pub visibility: Visibility,
    /// Category slug
    pub category: Option<String>,
    /// Case-insensitive substring match against title and excerpt
    pub search: Option<String>,
    /// Featured flag
    pub featured: Option<bool>,
}

impl PostFilter {
    /// A predicate with no restrictions beyond visibility
    pub fn for_visibility(visibility: Visibility) -> Self {
        Self {
            visibility,
            category: None,
            search: None,
            featured: None,
        }
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamping out-of-range values
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.limit) as i64
    }

    /// Get the limit for database queries
    pub fn take(&self) -> i64 {
        self.limit as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items matching the predicate, across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 0;
        }
        ((self.total as u32) + self.limit - 1) / self.limit
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Map the items into another type, keeping the pagination window
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_admin() {
        assert_eq!(Visibility::from_admin(true), Visibility::Admin);
        assert_eq!(Visibility::from_admin(false), Visibility::Public);
        assert!(Visibility::Admin.includes_drafts());
        assert!(!Visibility::Public.includes_drafts());
    }

    #[test]
    fn test_list_params() {
        let params = ListParams::new(1, 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.take(), 10);

        let params = ListParams::new(3, 5);
        assert_eq!(params.offset(), 10);
        assert_eq!(params.take(), 5);

        // Page 0 becomes 1, limit clamped to 100
        let params = ListParams::new(0, 200);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 100);

        // Limit 0 becomes 1
        let params = ListParams::new(1, 0);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn test_paged_result_total_pages() {
        let params = ListParams::new(1, 10);
        let result = PagedResult::new(vec![1, 2, 3], 25, &params);
        assert_eq!(result.total_pages(), 3);

        let result = PagedResult::new(Vec::<i32>::new(), 0, &params);
        assert_eq!(result.total_pages(), 0);
        assert!(result.is_empty());

        let result = PagedResult::new(vec![1], 10, &params);
        assert_eq!(result.total_pages(), 1);
    }

    #[test]
    fn test_paged_result_map() {
        let params = ListParams::new(2, 10);
        let result = PagedResult::new(vec![1, 2, 3], 13, &params).map(|n| n * 2);
        assert_eq!(result.items, vec![2, 4, 6]);
        assert_eq!(result.total, 13);
        assert_eq!(result.page, 2);
    }

    #[test]
    fn test_post_filter_default_shape() {
        let filter = PostFilter::for_visibility(Visibility::Public);
        assert_eq!(filter.visibility, Visibility::Public);
        assert!(filter.category.is_none());
        assert!(filter.search.is_none());
        assert!(filter.featured.is_none());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// total_pages is always ceil(total / limit)
        #[test]
        fn pagination_total_pages_is_ceiling(total in 0i64..10_000, limit in 1u32..100) {
            let params = ListParams::new(1, limit);
            let result = PagedResult::new(Vec::<i64>::new(), total, &params);
            let expected = ((total as f64) / (limit as f64)).ceil() as u32;
            prop_assert_eq!(result.total_pages(), expected);
        }

        /// offset never goes negative and grows linearly with page
        #[test]
        fn pagination_offset_is_linear(page in 1u32..1000, limit in 1u32..100) {
            let params = ListParams::new(page, limit);
            prop_assert_eq!(params.offset(), ((page - 1) * limit) as i64);
        }
    }
}
