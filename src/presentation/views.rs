use crate::application::error::{ErrorReport, HttpError};
use crate::application::manager::ManagerSnapshot;
use crate::domain::posts::PostFilter;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use postdeck_api_types::{Post, PostId};
use thiserror::Error;
use url::form_urlencoded;

const SITE_TITLE: &str = "Post Manager";
const PATCH_TITLE: &str = "Updated Title";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response() -> Response {
    let view = LayoutContext::new(ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub site_title: &'static str,
    /// Set while the listing is still loading; the page then reloads itself.
    pub refresh_href: Option<String>,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(content: T) -> Self {
        Self {
            site_title: SITE_TITLE,
            refresh_href: None,
            content,
        }
    }

    pub fn with_refresh(self, href: String) -> Self {
        Self {
            refresh_href: Some(href),
            ..self
        }
    }
}

#[derive(Clone)]
pub struct PostRowView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub user_id: String,
    pub edit_action: String,
    pub patch_action: String,
    pub delete_action: String,
}

impl PostRowView {
    fn from_post(post: &Post) -> Self {
        let segment = path_segment(&post.id);
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id.map(|id| id.to_string()).unwrap_or_default(),
            edit_action: format!("/posts/{segment}/edit"),
            patch_action: format!("/posts/{segment}/patch"),
            delete_action: format!("/posts/{segment}/delete"),
        }
    }
}

#[derive(Clone)]
pub struct PostsPageView {
    /// Current filter as typed into the filter input; carried by every form.
    pub filter_value: String,
    /// Text replacing the list (loading, error, empty, malformed).
    pub status_message: Option<&'static str>,
    pub shows_forms: bool,
    pub notice: Option<&'static str>,
    pub posts: Vec<PostRowView>,
    pub patch_title: &'static str,
}

impl PostsPageView {
    pub fn from_snapshot(snapshot: &ManagerSnapshot) -> Self {
        Self {
            filter_value: snapshot.filter.input_value(),
            status_message: snapshot.view.status_message(),
            shows_forms: snapshot.view.shows_forms(),
            notice: snapshot.notice.map(|notice| notice.message()),
            posts: snapshot
                .view
                .posts()
                .iter()
                .map(PostRowView::from_post)
                .collect(),
            patch_title: PATCH_TITLE,
        }
    }
}

#[derive(Template)]
#[template(path = "posts.html")]
pub struct PostsTemplate {
    pub view: LayoutContext<PostsPageView>,
}

/// Build the full page for a snapshot; a loading snapshot reloads itself.
pub fn posts_page(snapshot: &ManagerSnapshot) -> PostsTemplate {
    let mut view = LayoutContext::new(PostsPageView::from_snapshot(snapshot));
    if snapshot.view.is_loading() {
        view = view.with_refresh(listing_href(snapshot.filter));
    }
    PostsTemplate { view }
}

pub struct ErrorPageView {
    pub status: u16,
    pub message: &'static str,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: "Page not found",
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

/// Location of the listing page for `filter`.
pub fn listing_href(filter: PostFilter) -> String {
    match filter.user_id() {
        Some(user_id) => format!("/?userId={user_id}"),
        None => "/".to_string(),
    }
}

fn path_segment(id: &PostId) -> String {
    // form encoding writes spaces as `+`, which a path would keep literally
    form_urlencoded::byte_serialize(id.to_string().as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
