use std::fmt;

use postdeck_api_types::{Post, PostPatchPayload, PostPayload};
use serde_json::Value;

use super::error::DomainError;

/// Optional user constraint applied to the listing query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PostFilter {
    user_id: Option<i64>,
}

impl PostFilter {
    pub const ALL: PostFilter = PostFilter { user_id: None };

    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Interpret raw numeric-input text. Blank or non-integer input means
    /// "all posts"; negative values are kept and left for the server to judge.
    pub fn from_input(raw: Option<&str>) -> Self {
        let user_id = raw
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse::<i64>().ok());
        Self { user_id }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// Value to put back into a filter input or `userId` query parameter.
    pub fn input_value(&self) -> String {
        self.user_id.map(|id| id.to_string()).unwrap_or_default()
    }
}

impl fmt::Display for PostFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.user_id {
            Some(id) => write!(f, "userId={id}"),
            None => f.write_str("all"),
        }
    }
}

/// Validated title/body/user triple used for create and full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: String,
    body: String,
    user_id: i64,
}

impl PostDraft {
    pub fn new(title: &str, body: &str, user_id: &str) -> Result<Self, DomainError> {
        let title = required_text("title", title)?;
        let body = required_text("body", body)?;
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(DomainError::validation("user id is required"));
        }
        let user_id = user_id
            .parse::<i64>()
            .map_err(|_| DomainError::validation(format!("user id `{user_id}` is not a number")))?;

        Ok(Self {
            title,
            body,
            user_id,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn to_payload(&self) -> PostPayload {
        PostPayload {
            title: self.title.clone(),
            body: self.body.clone(),
            user_id: self.user_id,
        }
    }
}

/// Non-empty set of fields for a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPatch {
    payload: PostPatchPayload,
}

impl PostPatch {
    pub fn new(
        title: Option<String>,
        body: Option<String>,
        user_id: Option<i64>,
    ) -> Result<Self, DomainError> {
        let title = title.map(|value| required_text("title", &value)).transpose()?;
        let body = body.map(|value| required_text("body", &value)).transpose()?;
        let payload = PostPatchPayload {
            title,
            body,
            user_id,
        };
        if payload.is_empty() {
            return Err(DomainError::validation(
                "a patch must change at least one field",
            ));
        }
        Ok(Self { payload })
    }

    pub fn title(title: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(Some(title.into()), None, None)
    }

    pub fn payload(&self) -> &PostPatchPayload {
        &self.payload
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Check a listing body before anything is displayed.
///
/// Every entry needs an `id` and a `title`; one bad entry rejects the whole
/// listing rather than rendering the valid remainder.
pub fn parse_listing(value: Value) -> Result<Vec<Post>, DomainError> {
    let Value::Array(entries) = value else {
        return Err(DomainError::data_shape("listing is not a JSON array"));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<Post>(entry)
                .map_err(|err| DomainError::data_shape(format!("entry {index}: {err}")))
        })
        .collect()
}

/// Check a single-post body (create/replace/patch/get responses).
pub fn parse_post(value: Value) -> Result<Post, DomainError> {
    serde_json::from_value::<Post>(value).map_err(|err| DomainError::data_shape(err.to_string()))
}
