//! When a post may be shown to readers other than its author.
//!
//! A post is visible once it is published, its `pub_date` has passed and its
//! category (if it has one) is published too. The same rule exists as a SQL
//! predicate for listings and as a plain function for single loaded posts.

use chrono::{DateTime, Utc};

/// SQL form of [`is_visible`]. Expects `posts` aliased as `p`, categories
/// left-joined as `c` and the current time bound as `$1`.
pub const VISIBLE_SQL: &str =
    "(p.is_published AND p.pub_date <= $1 AND COALESCE(c.is_published, TRUE))";

pub fn is_visible(
    is_published: bool,
    pub_date: DateTime<Utc>,
    category_is_published: Option<bool>,
    now: DateTime<Utc>,
) -> bool {
    is_published && pub_date <= now && category_is_published.unwrap_or(true)
}
