use std::{sync::Arc, time::Duration};

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use postdeck_api_types::PostId;
use tracing::{debug, error};

use crate::{
    application::{manager::PostManager, view_state::MutationKind},
    domain::posts::PostFilter,
    presentation::views::{
        listing_href, posts_page, render_not_found_response, render_template_response,
    },
};

use super::{
    forms::{FilterForm, ListingQuery, PatchForm, PostForm},
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub manager: Arc<PostManager>,
    /// Longest a page request waits for the listing before rendering the loading state.
    pub render_wait: Duration,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/posts", post(create_post))
        .route("/posts/{id}/edit", post(replace_post))
        .route("/posts/{id}/patch", post(patch_post))
        .route("/posts/{id}/delete", post(delete_post))
        .route("/health", get(health))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index(State(state): State<HttpState>, Query(query): Query<ListingQuery>) -> Response {
    let filter = query.filter();

    // The fetch runs detached so a slow remote only delays this page by `render_wait`;
    // its result still lands in the manager for the reload.
    let manager = state.manager.clone();
    let fetch = tokio::spawn(async move { manager.show(filter).await });
    match tokio::time::timeout(state.render_wait, fetch).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(%filter, error = %err, "listing task failed"),
        Err(_) => debug!(%filter, "listing still loading, rendering placeholder"),
    }

    let snapshot = state.manager.snapshot();
    render_template_response(posts_page(&snapshot), StatusCode::OK)
}

async fn create_post(State(state): State<HttpState>, Form(form): Form<PostForm>) -> Response {
    match form.draft() {
        Ok(draft) => {
            if let Err(err) = state.manager.create(&draft).await {
                debug!(error = %err, "create left a notice");
            }
        }
        Err(err) => {
            state.manager.reject_input(MutationKind::Create, err);
        }
    }
    back_to_listing(form.filter())
}

async fn replace_post(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> Response {
    let id = PostId::parse(&id);
    match form.draft() {
        Ok(draft) => {
            if let Err(err) = state.manager.replace(&id, &draft).await {
                debug!(%id, error = %err, "replace left a notice");
            }
        }
        Err(err) => {
            state.manager.reject_input(MutationKind::Replace, err);
        }
    }
    back_to_listing(form.filter())
}

async fn patch_post(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Form(form): Form<PatchForm>,
) -> Response {
    let id = PostId::parse(&id);
    match form.patch() {
        Ok(patch) => {
            if let Err(err) = state.manager.patch(&id, &patch).await {
                debug!(%id, error = %err, "patch left a notice");
            }
        }
        Err(err) => {
            state.manager.reject_input(MutationKind::Patch, err);
        }
    }
    back_to_listing(form.filter())
}

async fn delete_post(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Form(form): Form<FilterForm>,
) -> Response {
    let id = PostId::parse(&id);
    if let Err(err) = state.manager.delete(&id).await {
        debug!(%id, error = %err, "delete left a notice");
    }
    back_to_listing(form.filter())
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback_router() -> Response {
    render_not_found_response()
}

fn back_to_listing(filter: PostFilter) -> Response {
    Redirect::to(&listing_href(filter)).into_response()
}
