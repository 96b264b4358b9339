//! Post manager: owns the view state and drives the data access port.
//!
//! Every list fetch takes a ticket stamped with a generation. Only the
//! completion holding the latest generation may touch the view, so overlapping
//! fetches resolve to whatever was issued last. The state lock is never held
//! across a network call.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use metrics::counter;
use postdeck_api_types::{Post, PostId};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::error::DomainError;
use crate::domain::posts::{PostDraft, PostFilter, PostPatch};

use super::lock::mutex_lock;
use super::query_cache::QueryCache;
use super::remote::{FetchError, PostsApi};
use super::view_state::{MutationKind, Notice, ViewState};

pub const METRIC_LIST_FETCH: &str = "postdeck_list_fetch_total";

const SOURCE: &str = "application::manager";

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("invalid {kind} input: {source}")]
    InvalidInput {
        kind: MutationKind,
        #[source]
        source: DomainError,
    },
    #[error("{kind} failed: {source}")]
    Mutation {
        kind: MutationKind,
        #[source]
        source: FetchError,
    },
}

/// Copy of the manager state handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSnapshot {
    pub filter: PostFilter,
    pub view: ViewState,
    pub notice: Option<Notice>,
}

#[derive(Debug)]
struct ManagerState {
    filter: PostFilter,
    mounted: bool,
    generation: u64,
    view: ViewState,
    notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    generation: u64,
    filter: PostFilter,
}

pub struct PostManager {
    api: Arc<dyn PostsApi>,
    cache: QueryCache,
    state: Mutex<ManagerState>,
}

impl PostManager {
    pub fn new(api: Arc<dyn PostsApi>, cache_capacity: NonZeroUsize) -> Self {
        Self {
            api,
            cache: QueryCache::new(cache_capacity),
            state: Mutex::new(ManagerState {
                filter: PostFilter::ALL,
                mounted: false,
                generation: 0,
                view: ViewState::Loading,
                notice: None,
            }),
        }
    }

    pub fn snapshot(&self) -> ManagerSnapshot {
        let state = mutex_lock(&self.state, SOURCE, "snapshot");
        ManagerSnapshot {
            filter: state.filter,
            view: state.view.clone(),
            notice: state.notice,
        }
    }

    /// First fetch for the current filter.
    pub async fn mount(&self) {
        let filter = mutex_lock(&self.state, SOURCE, "mount").filter;
        self.set_filter(filter).await;
    }

    /// Page-load entry point: fetches only when there is something new to show
    /// or the previous attempt needs a retry.
    pub async fn show(&self, filter: PostFilter) {
        let needs_fetch = {
            let state = mutex_lock(&self.state, SOURCE, "show");
            !state.mounted
                || state.filter != filter
                || matches!(state.view, ViewState::Failed | ViewState::Malformed)
        };
        if needs_fetch {
            self.set_filter(filter).await;
        }
    }

    /// Switch the listing to `filter`, served from cache when possible.
    pub async fn set_filter(&self, filter: PostFilter) {
        let ticket = {
            let mut state = mutex_lock(&self.state, SOURCE, "set_filter");
            state.filter = filter;
            state.mounted = true;
            match self.cache.get(&filter) {
                Some(posts) => {
                    debug!(%filter, count = posts.len(), "serving cached listing");
                    state.generation += 1;
                    state.view = ViewState::Loaded(posts);
                    None
                }
                None => Some(Self::begin_fetch(&mut state)),
            }
        };

        if let Some(ticket) = ticket {
            self.run_fetch(ticket).await;
        }
    }

    /// Drop every cached listing and re-run the one for the current filter.
    pub async fn refresh(&self) {
        let ticket = {
            let mut state = mutex_lock(&self.state, SOURCE, "refresh");
            state.mounted = true;
            // Invalidate and bump the generation in one critical section, so a
            // listing already in flight can no longer write back into the cache.
            self.cache.invalidate_all();
            Self::begin_fetch(&mut state)
        };
        self.run_fetch(ticket).await;
    }

    pub async fn create(&self, draft: &PostDraft) -> Result<Post, ManagerError> {
        let result = self.api.create_post(draft).await;
        self.finish_mutation(MutationKind::Create, result).await
    }

    pub async fn replace(&self, id: &PostId, draft: &PostDraft) -> Result<Post, ManagerError> {
        let result = self.api.replace_post(id, draft).await;
        self.finish_mutation(MutationKind::Replace, result).await
    }

    pub async fn patch(&self, id: &PostId, patch: &PostPatch) -> Result<Post, ManagerError> {
        let result = self.api.patch_post(id, patch).await;
        self.finish_mutation(MutationKind::Patch, result).await
    }

    pub async fn delete(&self, id: &PostId) -> Result<(), ManagerError> {
        let result = self.api.delete_post(id).await;
        self.finish_mutation(MutationKind::Delete, result).await
    }

    /// Record form input that never made it to a request.
    pub fn reject_input(&self, kind: MutationKind, source: DomainError) -> ManagerError {
        info!(kind = kind.as_str(), error = %source, "rejected mutation input");
        mutex_lock(&self.state, SOURCE, "reject_input").notice = Some(Notice::InvalidInput(kind));
        ManagerError::InvalidInput { kind, source }
    }

    fn begin_fetch(state: &mut ManagerState) -> FetchTicket {
        state.generation += 1;
        state.view = ViewState::Loading;
        FetchTicket {
            generation: state.generation,
            filter: state.filter,
        }
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> bool {
        debug!(filter = %ticket.filter, generation = ticket.generation, "fetching listing");
        let result = self.api.list_posts(ticket.filter).await;
        self.complete_fetch(ticket, result)
    }

    fn complete_fetch(&self, ticket: FetchTicket, result: Result<Vec<Post>, FetchError>) -> bool {
        let mut state = mutex_lock(&self.state, SOURCE, "complete_fetch");
        if ticket.generation != state.generation {
            debug!(
                filter = %ticket.filter,
                generation = ticket.generation,
                latest = state.generation,
                "discarding stale listing"
            );
            counter!(METRIC_LIST_FETCH, "outcome" => "stale").increment(1);
            return false;
        }

        state.view = match result {
            Ok(posts) => {
                debug!(filter = %ticket.filter, count = posts.len(), "listing loaded");
                counter!(METRIC_LIST_FETCH, "outcome" => "loaded").increment(1);
                self.cache.put(ticket.filter, posts.clone());
                ViewState::Loaded(posts)
            }
            Err(err) if err.is_data_shape() => {
                warn!(filter = %ticket.filter, error = %err, "listing has unexpected shape");
                counter!(METRIC_LIST_FETCH, "outcome" => "malformed").increment(1);
                ViewState::Malformed
            }
            Err(err) => {
                warn!(filter = %ticket.filter, error = %err, "listing failed");
                counter!(METRIC_LIST_FETCH, "outcome" => "failed").increment(1);
                ViewState::Failed
            }
        };
        true
    }

    async fn finish_mutation<T>(
        &self,
        kind: MutationKind,
        result: Result<T, FetchError>,
    ) -> Result<T, ManagerError> {
        match result {
            Ok(value) => {
                info!(kind = kind.as_str(), "mutation succeeded");
                mutex_lock(&self.state, SOURCE, "finish_mutation").notice = None;
                self.refresh().await;
                Ok(value)
            }
            Err(source) => {
                warn!(kind = kind.as_str(), error = %source, "mutation failed");
                mutex_lock(&self.state, SOURCE, "finish_mutation").notice =
                    Some(Notice::MutationFailed(kind));
                Err(ManagerError::Mutation { kind, source })
            }
        }
    }
}
