//! Rendering modes of the post list and the fixed texts shown for them.

use std::fmt;

use postdeck_api_types::Post;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const LIST_ERROR_MESSAGE: &str = "Error loading posts!";
pub const EMPTY_MESSAGE: &str = "No posts available";
pub const MALFORMED_MESSAGE: &str = "Unexpected data format";
pub const INVALID_INPUT_MESSAGE: &str = "Title, body and user id are required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Failed,
    Loaded(Vec<Post>),
    /// The listing arrived but at least one entry cannot be displayed.
    Malformed,
}

impl ViewState {
    /// Fixed message replacing the list, if any.
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            ViewState::Loading => Some(LOADING_MESSAGE),
            ViewState::Failed => Some(LIST_ERROR_MESSAGE),
            ViewState::Loaded(posts) if posts.is_empty() => Some(EMPTY_MESSAGE),
            ViewState::Loaded(_) => None,
            ViewState::Malformed => Some(MALFORMED_MESSAGE),
        }
    }

    pub fn posts(&self) -> &[Post] {
        match self {
            ViewState::Loaded(posts) => posts,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    /// Loading and Error replace the whole page; the other modes keep the forms.
    pub fn shows_forms(&self) -> bool {
        !matches!(self, ViewState::Loading | ViewState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Replace,
    Patch,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Replace => "replace",
            MutationKind::Patch => "patch",
            MutationKind::Delete => "delete",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            MutationKind::Create => "Error creating post",
            MutationKind::Replace => "Error updating post",
            MutationKind::Patch => "Error patching post",
            MutationKind::Delete => "Error deleting post",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message left behind by the last mutation that did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    MutationFailed(MutationKind),
    InvalidInput(MutationKind),
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::MutationFailed(kind) => kind.failure_message(),
            Notice::InvalidInput(_) => INVALID_INPUT_MESSAGE,
        }
    }
}
