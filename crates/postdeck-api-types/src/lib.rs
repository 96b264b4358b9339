//! Request and response shapes of the remote post resource.
//!
//! Field names follow the remote JSON (`userId`), identifiers are kept opaque.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Server-assigned post identifier.
///
/// The remote API hands out numbers, but nothing in the client depends on
/// that: any JSON number or string is carried through untouched and written
/// back into URLs exactly as it arrived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Number(value) => write!(f, "{value}"),
            PostId::Text(value) => f.write_str(value),
        }
    }
}

impl PostId {
    /// Identifier taken from a URL segment or command line.
    ///
    /// Kept as text, byte for byte: `007` and `7` name different posts.
    pub fn parse(raw: &str) -> Self {
        PostId::Text(raw.to_string())
    }
}

impl FromStr for PostId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        PostId::Number(value.into())
    }
}

/// A post as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_body")]
    pub body: String,
    #[serde(
        default,
        deserialize_with = "lenient_user_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<i64>,
}

/// `null` or a non-string body displays as empty.
fn lenient_body<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(body)) => body,
        _ => String::new(),
    })
}

/// Form-submitted posts come back with `"userId": "1"`; unusable values are dropped.
fn lenient_user_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Body of a create (`POST`) or full replacement (`PUT`) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

/// Body of a partial update (`PATCH`) request; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatchPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl PostPatchPayload {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.user_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_accepts_numeric_and_text_ids() {
        let numeric: Post =
            serde_json::from_value(json!({"id": 7, "title": "t", "body": "b", "userId": 1}))
                .expect("numeric id");
        assert_eq!(numeric.id, PostId::from(7));
        assert_eq!(numeric.user_id, Some(1));

        let text: Post =
            serde_json::from_value(json!({"id": "abc", "title": "t"})).expect("text id");
        assert_eq!(text.id, PostId::Text("abc".into()));
        assert_eq!(text.body, "");
        assert_eq!(text.user_id, None);
    }

    #[test]
    fn negative_and_fractional_ids_keep_their_json_text() {
        let negative: Post =
            serde_json::from_value(json!({"id": -3, "title": "t"})).expect("negative id");
        assert_eq!(negative.id.to_string(), "-3");

        let fractional: Post =
            serde_json::from_value(json!({"id": 1.5, "title": "t"})).expect("fractional id");
        assert_eq!(fractional.id.to_string(), "1.5");
    }

    #[test]
    fn null_body_and_string_user_id_still_display() {
        let post: Post = serde_json::from_value(
            json!({"id": 1, "title": "Post 1", "body": null, "userId": "1"}),
        )
        .expect("lenient fields");
        assert_eq!(post.body, "");
        assert_eq!(post.user_id, Some(1));

        let post: Post = serde_json::from_value(
            json!({"id": 2, "title": "Post 2", "body": 5, "userId": "someone"}),
        )
        .expect("unusable fields are dropped");
        assert_eq!(post.body, "");
        assert_eq!(post.user_id, None);
    }

    #[test]
    fn id_and_title_must_be_present_and_typed() {
        assert!(serde_json::from_value::<Post>(json!({"title": "t"})).is_err());
        assert!(serde_json::from_value::<Post>(json!({"id": null, "title": "t"})).is_err());
        assert!(serde_json::from_value::<Post>(json!({"id": 1, "title": 2})).is_err());
    }

    #[test]
    fn post_without_title_is_rejected() {
        let result = serde_json::from_value::<Post>(json!({"id": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn payload_uses_camel_case_user_id() {
        let payload = PostPayload {
            title: "t".into(),
            body: "b".into(),
            user_id: 3,
        };
        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value, json!({"title": "t", "body": "b", "userId": 3}));
    }

    #[test]
    fn patch_payload_skips_absent_fields() {
        let patch = PostPatchPayload {
            title: Some("Updated Title".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(value, json!({"title": "Updated Title"}));
        assert!(!patch.is_empty());
        assert!(PostPatchPayload::default().is_empty());
    }

    #[test]
    fn post_id_parses_and_displays() {
        assert_eq!("007".parse::<PostId>(), Ok(PostId::Text("007".into())));
        assert_eq!("+5".parse::<PostId>(), Ok(PostId::Text("+5".into())));
        assert_eq!(PostId::parse("007").to_string(), "007");
        assert_eq!(PostId::from(5).to_string(), "5");
    }
}
