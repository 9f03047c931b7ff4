//! Cursor pagination query parameters and page response.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use uuid::Uuid;
use validator::Validate;

use super::link::LinkResponse;
use crate::domain::entities::LinkPage;

/// Query parameters of `GET /links`.
///
/// Uses `serde_with` to parse values from query strings.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListLinksQuery {
    /// Page size, 1..=100. Defaults to 20.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,

    /// Id of the last link of the previous page.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub cursor: Option<Uuid>,
}

/// One page of links.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPageResponse {
    pub links: Vec<LinkResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Uuid>,
}

impl From<LinkPage> for LinkPageResponse {
    fn from(page: LinkPage) -> Self {
        Self {
            links: page.links.into_iter().map(LinkResponse::from).collect(),
            next_cursor: page.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(params: &[(&str, &str)]) -> Result<ListLinksQuery, serde_json::Error> {
        let map: serde_json::Map<String, serde_json::Value> = params
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map))
    }

    #[test]
    fn test_defaults() {
        let q = query(&[]).unwrap();
        assert!(q.limit.is_none());
        assert!(q.cursor.is_none());
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_parses_limit_and_cursor() {
        let id = Uuid::now_v7();
        let q = query(&[("limit", "10"), ("cursor", &id.to_string())]).unwrap();

        assert_eq!(q.limit, Some(10));
        assert_eq!(q.cursor, Some(id));
    }

    #[test]
    fn test_limit_range() {
        assert!(query(&[("limit", "0")]).unwrap().validate().is_err());
        assert!(query(&[("limit", "101")]).unwrap().validate().is_err());
        assert!(query(&[("limit", "100")]).unwrap().validate().is_ok());
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(query(&[("limit", "ten")]).is_err());
        assert!(query(&[("cursor", "not-a-uuid")]).is_err());
    }

    #[test]
    fn test_last_page_has_no_cursor_field() {
        let json = serde_json::to_value(LinkPageResponse::from(LinkPage::default())).unwrap();
        assert!(json.get("nextCursor").is_none());
        assert_eq!(json["links"], serde_json::json!([]));
    }
}
