//! Form and query payloads of the post pages.
//!
//! Every field is optional at the wire level so that a half-filled form still
//! reaches validation and ends up as a notice instead of a 422.

use serde::Deserialize;

use crate::domain::error::DomainError;
use crate::domain::posts::{PostDraft, PostFilter, PostPatch};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ListingQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

impl ListingQuery {
    pub(super) fn filter(&self) -> PostFilter {
        PostFilter::from_input(self.user_id.as_deref())
    }
}

/// Create and full-replace form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PostForm {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: String,
    filter: Option<String>,
}

impl PostForm {
    pub(super) fn filter(&self) -> PostFilter {
        PostFilter::from_input(self.filter.as_deref())
    }

    pub(super) fn draft(&self) -> Result<PostDraft, DomainError> {
        PostDraft::new(&self.title, &self.body, &self.user_id)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PatchForm {
    title: Option<String>,
    body: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    filter: Option<String>,
}

impl PatchForm {
    pub(super) fn filter(&self) -> PostFilter {
        PostFilter::from_input(self.filter.as_deref())
    }

    /// Blank inputs mean "leave unchanged".
    pub(super) fn patch(&self) -> Result<PostPatch, DomainError> {
        let user_id = present(&self.user_id)
            .map(|value| {
                value.parse::<i64>().map_err(|_| {
                    DomainError::validation(format!("user id `{value}` is not a number"))
                })
            })
            .transpose()?;

        PostPatch::new(
            present(&self.title).map(str::to_string),
            present(&self.body).map(str::to_string),
            user_id,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FilterForm {
    filter: Option<String>,
}

impl FilterForm {
    pub(super) fn filter(&self) -> PostFilter {
        PostFilter::from_input(self.filter.as_deref())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
