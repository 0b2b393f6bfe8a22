//! REST client for the mind-map service.
//!
//! DESIGN
//! ======
//! Every public method issues exactly one HTTP request: no retries, no
//! timeouts, no backoff. Non-success responses become [`ApiError`] values
//! carrying the operation name, status, reason phrase and response body, so
//! callers can show a banner without inspecting the transport.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ApiError;
use super::types::{
    CreateNodeBody, CreateSpaceBody, Node, NodeOrder, Space, UpdateNodeBody, UpdateSpaceBody, User, UserBody,
};
use crate::config::ClientConfig;

/// Thin HTTP wrapper around the spaces, nodes and users endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    base: Url,
}

impl ApiClient {
    /// Build a client rooted at `base_url` (trailing `/` is ignored).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// URL that can carry path segments, or [`ApiError::Transport`] if the
    /// HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&base_url.into());
        let base = parse_base_url(&base_url)?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport { operation: "build http client", message: e.to_string() })?;
        Ok(Self { http, base_url, base })
    }

    /// Build a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// As [`Self::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.base_url.clone())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // SPACES
    // =========================================================================

    /// `GET /spaces`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn list_spaces(&self) -> Result<Vec<Space>, ApiError> {
        self.fetch("list spaces", self.request(Method::GET, &["spaces"])).await
    }

    /// `POST /spaces`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn create_space(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Option<&str>,
    ) -> Result<Space, ApiError> {
        let body = CreateSpaceBody { name, description, owner_id };
        self.fetch("create space", self.request(Method::POST, &["spaces"]).json(&body))
            .await
    }

    /// `GET /spaces/{spaceId}`, which includes the full node tree.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown space, otherwise as [`Self::list_spaces`].
    pub async fn get_space(&self, space_id: &str) -> Result<Space, ApiError> {
        self.fetch("get space", self.request(Method::GET, &["spaces", space_id]))
            .await
    }

    /// `PUT /spaces/{spaceId}`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn update_space(
        &self,
        space_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Space, ApiError> {
        let body = UpdateSpaceBody { name, description };
        self.fetch("update space", self.request(Method::PUT, &["spaces", space_id]).json(&body))
            .await
    }

    /// `DELETE /spaces/{spaceId}`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete_space(&self, space_id: &str) -> Result<(), ApiError> {
        self.execute("delete space", self.request(Method::DELETE, &["spaces", space_id]))
            .await
            .map(drop)
    }

    /// Alias of [`Self::list_spaces`].
    ///
    /// # Errors
    ///
    /// See [`Self::list_spaces`].
    pub async fn get_spaces(&self) -> Result<Vec<Space>, ApiError> {
        self.list_spaces().await
    }

    /// Alias of [`Self::get_space`]; the space payload already carries the tree.
    ///
    /// # Errors
    ///
    /// See [`Self::get_space`].
    pub async fn get_space_tree(&self, space_id: &str) -> Result<Space, ApiError> {
        self.get_space(space_id).await
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// `POST /spaces/{spaceId}/nodes`. A missing parent creates a root node.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn create_node(
        &self,
        space_id: &str,
        title: &str,
        parent_node_id: Option<&str>,
        content_html: Option<&str>,
    ) -> Result<Node, ApiError> {
        let body = CreateNodeBody { title, parent_node_id, order_index: 0, content_html };
        let request = self.request(Method::POST, &["spaces", space_id, "nodes"]).json(&body);
        self.fetch("create node", request)
            .await
    }

    /// `GET /spaces/{spaceId}/nodes/{nodeId}` with full content fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown node, otherwise as [`Self::list_spaces`].
    pub async fn get_node(&self, space_id: &str, node_id: &str) -> Result<Node, ApiError> {
        self.fetch("get node", self.request(Method::GET, &["spaces", space_id, "nodes", node_id]))
            .await
    }

    /// `PUT /spaces/{spaceId}/nodes/{nodeId}`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn update_node(
        &self,
        space_id: &str,
        node_id: &str,
        title: Option<&str>,
        content_html: Option<&str>,
    ) -> Result<Node, ApiError> {
        let body = UpdateNodeBody { title, content_html };
        let request = self
            .request(Method::PUT, &["spaces", space_id, "nodes", node_id])
            .json(&body);
        self.fetch("update node", request).await
    }

    /// `DELETE /spaces/{spaceId}/nodes/{nodeId}`. The service removes the subtree too.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete_node(&self, space_id: &str, node_id: &str) -> Result<(), ApiError> {
        self.execute("delete node", self.request(Method::DELETE, &["spaces", space_id, "nodes", node_id]))
            .await
            .map(drop)
    }

    /// `POST /spaces/{spaceId}/nodes/reorder` with `[{nodeId, newOrderIndex}]`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn reorder_nodes(&self, space_id: &str, orders: &[NodeOrder]) -> Result<(), ApiError> {
        let request = self.request(Method::POST, &["spaces", space_id, "nodes", "reorder"]).json(orders);
        self.execute("reorder nodes", request)
            .await
            .map(drop)
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// `POST /users`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn create_user(&self, email: &str, name: &str) -> Result<User, ApiError> {
        let body = UserBody { email, name };
        self.fetch("create user", self.request(Method::POST, &["users"]).json(&body))
            .await
    }

    /// `GET /users/{userId}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown user, otherwise as [`Self::create_user`].
    pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        self.fetch("get user", self.request(Method::GET, &["users", user_id]))
            .await
    }

    /// `GET /users`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch("list users", self.request(Method::GET, &["users"])).await
    }

    /// `PUT /users/{userId}`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an unparsable body.
    pub async fn update_user(&self, user_id: &str, email: &str, name: &str) -> Result<User, ApiError> {
        let body = UserBody { email, name };
        self.fetch("update user", self.request(Method::PUT, &["users", user_id]).json(&body))
            .await
    }

    /// `DELETE /users/{userId}`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.execute("delete user", self.request(Method::DELETE, &["users", user_id]))
            .await
            .map(drop)
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// Every request is sent as JSON, bodyless ones included.
    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "api request");
        self.http.request(method, url).header(CONTENT_TYPE, "application/json")
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, operation: &'static str, request: RequestBuilder) -> Result<T, ApiError> {
        let text = self.execute(operation, request).await?;
        decode_body(operation, &text)
    }

    /// Send the request and return the raw body of a 2xx response.
    async fn execute(&self, operation: &'static str, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport { operation, message: e.to_string() })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport { operation, message: e.to_string() })?;

        debug!(operation, status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(body);
        }

        warn!(operation, status = status.as_u16(), %body, "api request failed");
        Err(status_error(operation, status, body))
    }
}

fn status_error(operation: &'static str, status: StatusCode, body: String) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound { operation, body };
    }
    ApiError::Http {
        operation,
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown Status").to_owned(),
        body,
    }
}

fn decode_body<T: DeserializeOwned>(operation: &'static str, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode { operation, message: e.to_string() })
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |message: String| ApiError::InvalidBaseUrl { url: raw.to_owned(), message };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_owned()));
    }
    Ok(url)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}
