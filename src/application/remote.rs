//! Data access port for the remote post resource.

use async_trait::async_trait;
use postdeck_api_types::{Post, PostId};
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::posts::{PostDraft, PostFilter, PostPatch};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("remote responded with status {status}")]
    Http { status: u16, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(String),
    #[error(transparent)]
    DataShape(DomainError),
    #[error("invalid request url: {0}")]
    Url(String),
}

impl FetchError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn is_data_shape(&self) -> bool {
        matches!(self, FetchError::DataShape(_))
    }
}

impl From<DomainError> for FetchError {
    fn from(err: DomainError) -> Self {
        Self::DataShape(err)
    }
}

/// One HTTP call per operation; implementations never touch view state.
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, FetchError>;

    async fn get_post(&self, id: &PostId) -> Result<Post, FetchError>;

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, FetchError>;

    async fn replace_post(&self, id: &PostId, draft: &PostDraft) -> Result<Post, FetchError>;

    async fn patch_post(&self, id: &PostId, patch: &PostPatch) -> Result<Post, FetchError>;

    async fn delete_post(&self, id: &PostId) -> Result<(), FetchError>;
}
