//! `reqwest` adapter for the remote post resource.

use std::time::Duration;

use async_trait::async_trait;
use postdeck_api_types::{Post, PostId};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::debug;

use crate::application::remote::{FetchError, PostsApi};
use crate::domain::posts::{PostDraft, PostFilter, PostPatch, parse_listing, parse_post};

use super::error::InfraError;

#[derive(Clone, Debug)]
pub struct RestPostsApi {
    client: Client,
    base: Url,
}

impl RestPostsApi {
    /// `base` is the collection URL; items live at `base/{id}`.
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, InfraError> {
        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("postdeck/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn list_url(&self, filter: PostFilter) -> Url {
        let mut url = self.base.clone();
        if let Some(user_id) = filter.user_id() {
            url.query_pairs_mut()
                .append_pair("userId", &user_id.to_string());
        }
        url
    }

    fn item_url(&self, id: &PostId) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Url(format!("{} cannot take a path segment", self.base)))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let response = request.send().await.map_err(FetchError::network)?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "remote responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::http(status.as_u16(), body));
        }
        Ok(response)
    }

    async fn json(response: Response) -> Result<Value, FetchError> {
        let bytes = response.bytes().await.map_err(FetchError::network)?;
        serde_json::from_slice(&bytes).map_err(|err| FetchError::Decode(err.to_string()))
    }

    async fn send_for_post(&self, request: RequestBuilder) -> Result<Post, FetchError> {
        let response = self.send(request).await?;
        let value = Self::json(response).await?;
        Ok(parse_post(value)?)
    }
}

#[async_trait]
impl PostsApi for RestPostsApi {
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, FetchError> {
        let url = self.list_url(filter);
        let response = self.send(self.client.get(url)).await?;
        let value = Self::json(response).await?;
        Ok(parse_listing(value)?)
    }

    async fn get_post(&self, id: &PostId) -> Result<Post, FetchError> {
        let url = self.item_url(id)?;
        self.send_for_post(self.client.get(url)).await
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, FetchError> {
        let request = self.client.post(self.base.clone()).json(&draft.to_payload());
        self.send_for_post(request).await
    }

    async fn replace_post(&self, id: &PostId, draft: &PostDraft) -> Result<Post, FetchError> {
        let url = self.item_url(id)?;
        let request = self.client.put(url).json(&draft.to_payload());
        self.send_for_post(request).await
    }

    async fn patch_post(&self, id: &PostId, patch: &PostPatch) -> Result<Post, FetchError> {
        let url = self.item_url(id)?;
        let request = self.client.patch(url).json(patch.payload());
        self.send_for_post(request).await
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), FetchError> {
        let url = self.item_url(id)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    fn api(server: &MockServer) -> RestPostsApi {
        let base = Url::parse(&server.url("/posts")).expect("base url");
        RestPostsApi::new(base, Some(Duration::from_secs(5))).expect("client")
    }

    #[tokio::test]
    async fn list_sends_user_filter_and_parses_posts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET").path("/posts").query_param("userId", "1");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"[{"id":1,"title":"Post 1","body":"b","userId":1}]"#);
        });

        let posts = api(&server)
            .list_posts(PostFilter::user(1))
            .await
            .expect("listing");
        mock.assert();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Post 1");
    }

    #[tokio::test]
    async fn list_without_filter_hits_collection() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET").path("/posts");
            then.status(200)
                .header("content-type", "application/json")
                .body("[]");
        });

        let posts = api(&server)
            .list_posts(PostFilter::ALL)
            .await
            .expect("listing");
        mock.assert();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/posts");
            then.status(503).body("down");
        });

        let err = api(&server)
            .list_posts(PostFilter::ALL)
            .await
            .expect_err("503");
        assert!(matches!(err, FetchError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn entry_without_title_is_shape_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/posts");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"[{"id":1}]"#);
        });

        let err = api(&server)
            .list_posts(PostFilter::ALL)
            .await
            .expect_err("shape");
        assert!(err.is_data_shape());
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/posts");
            then.status(200).body("<html>");
        });

        let err = api(&server)
            .list_posts(PostFilter::ALL)
            .await
            .expect_err("decode");
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let base = Url::parse("http://127.0.0.1:9/posts").expect("url");
        let api = RestPostsApi::new(base, Some(Duration::from_secs(2))).expect("client");

        let err = api
            .list_posts(PostFilter::ALL)
            .await
            .expect_err("connection refused");
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn create_posts_json_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/posts")
                .header("content-type", "application/json")
                .json_body(json!({"title": "T", "body": "B", "userId": 1}));
            then.status(201)
                .header("content-type", "application/json")
                .body(r#"{"id":101,"title":"T","body":"B","userId":1}"#);
        });

        let draft = PostDraft::new("T", "B", "1").expect("draft");
        let created = api(&server).create_post(&draft).await.expect("created");
        mock.assert();
        assert_eq!(created.id, PostId::from(101));
    }

    #[tokio::test]
    async fn replace_puts_to_item_url() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("PUT")
                .path("/posts/1")
                .json_body(json!({"title": "New", "body": "B", "userId": 2}));
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"id":1,"title":"New","body":"B","userId":2}"#);
        });

        let draft = PostDraft::new("New", "B", "2").expect("draft");
        let updated = api(&server)
            .replace_post(&PostId::from(1), &draft)
            .await
            .expect("replaced");
        mock.assert();
        assert_eq!(updated.title, "New");
    }

    #[tokio::test]
    async fn patch_sends_only_changed_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("PATCH")
                .path("/posts/7")
                .json_body(json!({"title": "Updated Title"}));
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"id":7,"title":"Updated Title","body":"old","userId":1}"#);
        });

        let patch = PostPatch::title("Updated Title").expect("patch");
        let patched = api(&server)
            .patch_post(&PostId::from(7), &patch)
            .await
            .expect("patched");
        mock.assert();
        assert_eq!(patched.body, "old");
    }

    #[tokio::test]
    async fn delete_of_unknown_id_fails() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("DELETE").path("/posts/999");
            then.status(404).body("{}");
        });

        let err = api(&server)
            .delete_post(&PostId::from(999))
            .await
            .expect_err("404");
        mock.assert();
        assert!(matches!(err, FetchError::Http { status: 404, .. }));
    }

    #[test]
    fn item_url_handles_trailing_slash() {
        let base = Url::parse("https://example.com/posts/").expect("url");
        let api = RestPostsApi::new(base, None).expect("client");
        let url = api.item_url(&PostId::from(3)).expect("item url");
        assert_eq!(url.as_str(), "https://example.com/posts/3");
    }

    #[test]
    fn item_url_escapes_text_ids() {
        let base = Url::parse("https://example.com/posts").expect("url");
        let api = RestPostsApi::new(base, None).expect("client");
        let url = api
            .item_url(&PostId::Text("a b".into()))
            .expect("item url");
        assert_eq!(url.as_str(), "https://example.com/posts/a%20b");
    }

    #[test]
    fn list_url_appends_user_filter() {
        let base = Url::parse("https://example.com/posts").expect("url");
        let api = RestPostsApi::new(base, None).expect("client");
        assert_eq!(
            api.list_url(PostFilter::user(-1)).as_str(),
            "https://example.com/posts?userId=-1"
        );
        assert_eq!(
            api.list_url(PostFilter::ALL).as_str(),
            "https://example.com/posts"
        );
    }
}
