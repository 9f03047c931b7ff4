//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A shortened URL link with its access counter.
///
/// `id` is a UUID v7, so ascending id order follows creation order and
/// doubles as the pagination key.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Link {
    pub id: Uuid,
    pub original_url: String,
    pub shortened_url: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: Uuid,
        original_url: String,
        shortened_url: String,
        access_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_url,
            shortened_url,
            access_count,
            created_at,
        }
    }

    /// Builds a fresh link from creation input: new id, zero accesses, `created_at = now`.
    pub fn from_new(new_link: NewLink) -> Self {
        Self::new(
            Uuid::now_v7(),
            new_link.original_url,
            new_link.shortened_url,
            0,
            Utc::now(),
        )
    }

    /// Projects the link onto the columns written to CSV reports.
    pub fn to_export_row(&self) -> ExportRow {
        ExportRow {
            original_url: self.original_url.clone(),
            shortened_url: self.shortened_url.clone(),
            access_count: self.access_count,
            created_at: self.created_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub original_url: String,
    pub shortened_url: String,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub original_url: Option<String>,
    pub shortened_url: Option<String>,
}

impl LinkPatch {
    /// Returns true when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.original_url.is_none() && self.shortened_url.is_none()
    }
}

/// One page of links produced by cursor pagination.
///
/// `next_cursor` is the id of the last link in `links` when more rows follow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub next_cursor: Option<Uuid>,
}

impl LinkPage {
    /// Builds a page from a scan that fetched up to `limit + 1` rows.
    ///
    /// The extra row only signals that more links follow; it is discarded and
    /// the cursor points at the last link kept.
    pub fn from_overfetch(mut links: Vec<Link>, limit: usize) -> Self {
        if links.len() <= limit {
            return Self {
                links,
                next_cursor: None,
            };
        }

        links.truncate(limit);
        let next_cursor = links.last().map(|link| link.id);

        Self { links, next_cursor }
    }
}

/// A single CSV report row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ExportRow {
    pub original_url: String,
    pub shortened_url: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let link = Link::new(
            id,
            "https://example.com".to_string(),
            "abc123".to_string(),
            0,
            now,
        );

        assert_eq!(link.id, id);
        assert_eq!(link.shortened_url, "abc123");
        assert_eq!(link.original_url, "https://example.com");
        assert_eq!(link.access_count, 0);
        assert_eq!(link.created_at, now);
    }

    #[test]
    fn test_from_new_starts_with_zero_accesses() {
        let link = Link::from_new(NewLink {
            original_url: "https://rust-lang.org".to_string(),
            shortened_url: "rust".to_string(),
        });

        assert_eq!(link.access_count, 0);
        assert_eq!(link.shortened_url, "rust");
        assert_eq!(link.original_url, "https://rust-lang.org");
    }

    #[test]
    fn test_from_new_ids_are_time_ordered() {
        let first = Link::from_new(NewLink {
            original_url: "https://a.com".to_string(),
            shortened_url: "aaa".to_string(),
        });
        let second = Link::from_new(NewLink {
            original_url: "https://b.com".to_string(),
            shortened_url: "bbb".to_string(),
        });

        assert!(first.id < second.id);
    }

    #[test]
    fn test_empty_patch() {
        assert!(LinkPatch::default().is_empty());

        let patch = LinkPatch {
            original_url: Some("https://new.com".to_string()),
            shortened_url: None,
        };
        assert!(!patch.is_empty());
    }

    fn links(count: usize) -> Vec<Link> {
        (0..count)
            .map(|n| {
                Link::from_new(NewLink {
                    original_url: format!("https://example.com/{n}"),
                    shortened_url: format!("key{n}"),
                })
            })
            .collect()
    }

    #[test]
    fn test_page_from_overfetch_with_more_rows() {
        let rows = links(11);
        let tenth = rows[9].id;

        let page = LinkPage::from_overfetch(rows, 10);

        assert_eq!(page.links.len(), 10);
        assert_eq!(page.next_cursor, Some(tenth));
    }

    #[test]
    fn test_page_from_overfetch_last_page() {
        let page = LinkPage::from_overfetch(links(5), 10);
        assert_eq!(page.links.len(), 5);
        assert!(page.next_cursor.is_none());

        let exact = LinkPage::from_overfetch(links(10), 10);
        assert_eq!(exact.links.len(), 10);
        assert!(exact.next_cursor.is_none());
    }

    #[test]
    fn test_to_export_row() {
        let link = Link::new(
            Uuid::now_v7(),
            "https://example.com".to_string(),
            "ex".to_string(),
            7,
            Utc::now(),
        );

        let row = link.to_export_row();
        assert_eq!(row.shortened_url, "ex");
        assert_eq!(row.access_count, 7);
        assert_eq!(row.created_at, link.created_at);
    }
}
