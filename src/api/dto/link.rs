//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::entities::{Link, LinkPatch};
use crate::utils::shortened_url::validate_shortened_url;

/// Request body for `POST /links`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// Redirect target (absolute URL).
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,

    #[validate(custom(function = "validate_shortened_url"))]
    pub shortened_url: String,
}

/// Request body for `PATCH /links/{shortenedUrl}`.
///
/// Omitted fields are left unchanged; at least one must be present.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "at_least_one_field"))]
pub struct UpdateLinkRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: Option<String>,

    #[validate(custom(function = "validate_shortened_url"))]
    pub shortened_url: Option<String>,
}

fn at_least_one_field(request: &UpdateLinkRequest) -> Result<(), ValidationError> {
    if request.original_url.is_none() && request.shortened_url.is_none() {
        return Err(ValidationError::new("empty_update")
            .with_message("At least one of originalUrl or shortenedUrl must be provided".into()));
    }
    Ok(())
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(request: UpdateLinkRequest) -> Self {
        LinkPatch {
            original_url: request.original_url,
            shortened_url: request.shortened_url,
        }
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: Uuid,
    pub original_url: String,
    pub shortened_url: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            original_url: link.original_url,
            shortened_url: link.shortened_url,
            access_count: link.access_count,
            created_at: link.created_at,
        }
    }
}

/// Response of `GET /links/{shortenedUrl}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalUrlResponse {
    pub original_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(json: &str) -> CreateLinkRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_create_request() {
        let request = create(r#"{"originalUrl": "https://example.com/a", "shortenedUrl": "my-link_1"}"#);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_rejects_relative_url() {
        let request = create(r#"{"originalUrl": "/just/a/path", "shortenedUrl": "abc"}"#);
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("original_url"));
    }

    #[test]
    fn test_create_rejects_bad_key() {
        for key in ["ab", "waytoolongkey", "has space", "export"] {
            let request = create(&format!(
                r#"{{"originalUrl": "https://example.com", "shortenedUrl": "{key}"}}"#
            ));
            assert!(request.validate().is_err(), "{key} should be rejected");
        }
    }

    #[test]
    fn test_update_requires_a_field() {
        let empty: UpdateLinkRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_err());

        let url_only: UpdateLinkRequest =
            serde_json::from_str(r#"{"originalUrl": "https://new.example.com"}"#).unwrap();
        assert!(url_only.validate().is_ok());
    }

    #[test]
    fn test_update_validates_present_key() {
        let request: UpdateLinkRequest = serde_json::from_str(r#"{"shortenedUrl": "x"}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_link_response_is_camel_case() {
        let link = Link::new(
            Uuid::now_v7(),
            "https://example.com".to_string(),
            "abc".to_string(),
            2,
            Utc::now(),
        );

        let json = serde_json::to_value(LinkResponse::from(link)).unwrap();

        assert_eq!(json["originalUrl"], "https://example.com");
        assert_eq!(json["shortenedUrl"], "abc");
        assert_eq!(json["accessCount"], 2);
        assert!(json.get("createdAt").is_some());
    }
}
