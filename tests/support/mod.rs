//! In-process mock of the mind-map REST service.
//!
//! Spaces, nodes and users live in one mutex-guarded store. A node's
//! generated content appears once it has been fetched `content_after` times,
//! and every request can be forced to fail with a 500.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mindmap::net::api::ApiClient;
use mindmap::net::types::{Node, NodeOrder, Space, TreeNode, User};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

const CREATED_AT: &str = "2024-01-01T00:00:00Z";

type Shared = Arc<Mutex<Store>>;

#[derive(Default)]
struct Store {
    spaces: Vec<Space>,
    nodes: Vec<Node>,
    users: Vec<User>,
    failing: bool,
    /// Fetch count at which generated content appears; `None` never generates.
    content_after: Option<usize>,
    node_fetches: HashMap<String, usize>,
    requests: usize,
    content_types: Vec<Option<String>>,
    paths: Vec<String>,
    last_node_update: Option<Value>,
}

pub struct MockService {
    pub base_url: String,
    store: Shared,
}

impl MockService {
    pub async fn start() -> Self {
        let store: Shared = Arc::new(Mutex::new(Store::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(store.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}"), store }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone()).unwrap()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    pub fn set_failing(&self, failing: bool) {
        self.store().failing = failing;
    }

    pub fn set_content_after(&self, fetches: Option<usize>) {
        self.store().content_after = fetches;
    }

    pub fn node_fetches(&self, node_id: &str) -> usize {
        self.store().node_fetches.get(node_id).copied().unwrap_or(0)
    }

    pub fn request_count(&self) -> usize {
        self.store().requests
    }

    /// `Content-Type` header of every request received, in order.
    pub fn content_types(&self) -> Vec<Option<String>> {
        self.store().content_types.clone()
    }

    /// Raw, still percent-encoded request paths, in order.
    pub fn paths(&self) -> Vec<String> {
        self.store().paths.clone()
    }

    pub fn last_node_update(&self) -> Option<Value> {
        self.store().last_node_update.clone()
    }

    /// Insert a node directly, bypassing the HTTP surface.
    pub fn seed_node(&self, space_id: &str, title: &str, parent: Option<&str>, order_index: i64) -> String {
        let node_id = Uuid::new_v4().to_string();
        self.store().nodes.push(Node {
            node_id: node_id.clone(),
            space_id: space_id.to_owned(),
            title: title.to_owned(),
            order_index,
            parent_node_id: parent.map(str::to_owned),
            created_at: CREATED_AT.to_owned(),
            updated_at: CREATED_AT.to_owned(),
            ..Node::default()
        });
        node_id
    }
}

fn router(store: Shared) -> Router {
    Router::new()
        .route("/spaces", get(list_spaces).post(create_space))
        .route("/spaces/{space_id}", get(get_space).put(update_space).delete(delete_space))
        .route("/spaces/{space_id}/nodes", post(create_node))
        .route("/spaces/{space_id}/nodes/reorder", post(reorder_nodes))
        .route("/spaces/{space_id}/nodes/{node_id}", get(get_node).put(update_node).delete(delete_node))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", get(get_user).put(update_user).delete(delete_user))
        .layer(middleware::from_fn_with_state(store.clone(), guard))
        .with_state(store)
}

async fn guard(State(store): State<Shared>, request: Request, next: Next) -> Response {
    let failing = {
        let mut store = store.lock().unwrap();
        store.requests += 1;
        let content_type = request.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_owned);
        store.content_types.push(content_type);
        store.paths.push(request.uri().path().to_owned());
        store.failing
    };
    if failing {
        return MockError(StatusCode::INTERNAL_SERVER_ERROR, "injected failure".into()).into_response();
    }
    next.run(request).await
}

struct MockError(StatusCode, String);

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

fn not_found(what: &str) -> MockError {
    MockError(StatusCode::NOT_FOUND, format!("{what} not found"))
}

// =============================================================================
// TREE ASSEMBLY
// =============================================================================

fn build_children(nodes: &[Node], parent: Option<&str>, depth: u32) -> Vec<TreeNode> {
    let mut level: Vec<&Node> = nodes.iter().filter(|n| n.parent_node_id.as_deref() == parent).collect();
    level.sort_by_key(|n| n.order_index);
    level
        .into_iter()
        .map(|n| TreeNode {
            node: Node { depth: Some(depth), ..n.clone() },
            children: build_children(nodes, Some(&n.node_id), depth + 1),
        })
        .collect()
}

fn depth_of(nodes: &[Node], node: &Node) -> u32 {
    let mut depth = 0;
    let mut parent = node.parent_node_id.as_deref();
    while let Some(id) = parent {
        depth += 1;
        parent = nodes.iter().find(|n| n.node_id == id).and_then(|n| n.parent_node_id.as_deref());
    }
    depth
}

fn subtree(nodes: &[Node], root: &str) -> Vec<String> {
    let mut ids = vec![root.to_owned()];
    let mut i = 0;
    while i < ids.len() {
        let current = ids[i].clone();
        ids.extend(
            nodes
                .iter()
                .filter(|n| n.parent_node_id.as_deref() == Some(current.as_str()))
                .map(|n| n.node_id.clone()),
        );
        i += 1;
    }
    ids
}

// =============================================================================
// SPACES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSpace {
    name: String,
    description: Option<String>,
    owner_id: Option<String>,
}

#[derive(Deserialize)]
struct SpacePatch {
    name: Option<String>,
    description: Option<String>,
}

async fn list_spaces(State(store): State<Shared>) -> Json<Vec<Space>> {
    Json(store.lock().unwrap().spaces.clone())
}

async fn create_space(State(store): State<Shared>, Json(body): Json<NewSpace>) -> (StatusCode, Json<Space>) {
    let space = Space {
        space_id: Uuid::new_v4().to_string(),
        name: body.name,
        description: body.description,
        owner_id: body.owner_id,
        created_at: CREATED_AT.to_owned(),
        updated_at: None,
        nodes: None,
    };
    store.lock().unwrap().spaces.push(space.clone());
    (StatusCode::CREATED, Json(space))
}

async fn get_space(State(store): State<Shared>, Path(space_id): Path<String>) -> Result<Json<Space>, MockError> {
    let store = store.lock().unwrap();
    let mut space = store.spaces.iter().find(|s| s.space_id == space_id).cloned().ok_or_else(|| not_found("space"))?;
    let nodes: Vec<Node> = store.nodes.iter().filter(|n| n.space_id == space_id).cloned().collect();
    space.nodes = Some(build_children(&nodes, None, 0));
    Ok(Json(space))
}

async fn update_space(
    State(store): State<Shared>,
    Path(space_id): Path<String>,
    Json(patch): Json<SpacePatch>,
) -> Result<Json<Space>, MockError> {
    let mut store = store.lock().unwrap();
    let space = store.spaces.iter_mut().find(|s| s.space_id == space_id).ok_or_else(|| not_found("space"))?;
    if let Some(name) = patch.name {
        space.name = name;
    }
    if let Some(description) = patch.description {
        space.description = Some(description);
    }
    space.updated_at = Some(CREATED_AT.to_owned());
    Ok(Json(space.clone()))
}

async fn delete_space(State(store): State<Shared>, Path(space_id): Path<String>) -> Result<StatusCode, MockError> {
    let mut store = store.lock().unwrap();
    let before = store.spaces.len();
    store.spaces.retain(|s| s.space_id != space_id);
    if store.spaces.len() == before {
        return Err(not_found("space"));
    }
    store.nodes.retain(|n| n.space_id != space_id);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewNode {
    title: String,
    parent_node_id: Option<String>,
    #[serde(default)]
    order_index: i64,
    #[serde(rename = "contentHTML")]
    content_html: Option<String>,
}

async fn create_node(
    State(store): State<Shared>,
    Path(space_id): Path<String>,
    Json(body): Json<NewNode>,
) -> Result<(StatusCode, Json<Node>), MockError> {
    let mut store = store.lock().unwrap();
    if !store.spaces.iter().any(|s| s.space_id == space_id) {
        return Err(not_found("space"));
    }
    if let Some(parent) = body.parent_node_id.as_deref() {
        if !store.nodes.iter().any(|n| n.node_id == parent && n.space_id == space_id) {
            return Err(MockError(StatusCode::BAD_REQUEST, "parent node not found".into()));
        }
    }
    let mut node = Node {
        node_id: Uuid::new_v4().to_string(),
        space_id,
        title: body.title,
        content_html: body.content_html,
        order_index: body.order_index,
        parent_node_id: body.parent_node_id,
        created_at: CREATED_AT.to_owned(),
        updated_at: CREATED_AT.to_owned(),
        ..Node::default()
    };
    node.depth = Some(depth_of(&store.nodes, &node));
    store.nodes.push(node.clone());
    Ok((StatusCode::CREATED, Json(node)))
}

async fn get_node(
    State(store): State<Shared>,
    Path((space_id, node_id)): Path<(String, String)>,
) -> Result<Json<Node>, MockError> {
    let mut store = store.lock().unwrap();
    let fetches = {
        let count = store.node_fetches.entry(node_id.clone()).or_insert(0);
        *count += 1;
        *count
    };
    let content_after = store.content_after;
    let index = store
        .nodes
        .iter()
        .position(|n| n.node_id == node_id && n.space_id == space_id)
        .ok_or_else(|| not_found("node"))?;

    if content_after.is_some_and(|after| fetches >= after) && store.nodes[index].content_html.is_none() {
        let node = &mut store.nodes[index];
        node.content = Some(format!("Notes on {}", node.title));
        node.content_html = Some(format!("<p>Notes on {}</p>", node.title));
    }
    let mut node = store.nodes[index].clone();
    node.depth = Some(depth_of(&store.nodes, &node));
    Ok(Json(node))
}

async fn update_node(
    State(store): State<Shared>,
    Path((space_id, node_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Node>, MockError> {
    let mut store = store.lock().unwrap();
    store.last_node_update = Some(body.clone());
    let node = store
        .nodes
        .iter_mut()
        .find(|n| n.node_id == node_id && n.space_id == space_id)
        .ok_or_else(|| not_found("node"))?;
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        node.title = title.to_owned();
    }
    if let Some(html) = body.get("contentHTML").and_then(Value::as_str) {
        node.content_html = Some(html.to_owned());
    }
    Ok(Json(node.clone()))
}

async fn delete_node(
    State(store): State<Shared>,
    Path((space_id, node_id)): Path<(String, String)>,
) -> Result<StatusCode, MockError> {
    let mut store = store.lock().unwrap();
    if !store.nodes.iter().any(|n| n.node_id == node_id && n.space_id == space_id) {
        return Err(not_found("node"));
    }
    let doomed = subtree(&store.nodes, &node_id);
    store.nodes.retain(|n| !doomed.contains(&n.node_id));
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_nodes(
    State(store): State<Shared>,
    Path(space_id): Path<String>,
    Json(orders): Json<Vec<NodeOrder>>,
) -> Result<Json<Value>, MockError> {
    let mut store = store.lock().unwrap();
    for order in &orders {
        let node = store
            .nodes
            .iter_mut()
            .find(|n| n.node_id == order.node_id && n.space_id == space_id)
            .ok_or_else(|| not_found("node"))?;
        node.order_index = order.new_order_index;
    }
    Ok(Json(json!({ "updated": orders.len() })))
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Deserialize)]
struct UserFields {
    email: String,
    name: String,
}

async fn list_users(State(store): State<Shared>) -> Json<Vec<User>> {
    Json(store.lock().unwrap().users.clone())
}

async fn create_user(State(store): State<Shared>, Json(body): Json<UserFields>) -> (StatusCode, Json<User>) {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: body.email,
        name: body.name,
        created_at: CREATED_AT.to_owned(),
    };
    store.lock().unwrap().users.push(user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(store): State<Shared>, Path(user_id): Path<String>) -> Result<Json<User>, MockError> {
    let store = store.lock().unwrap();
    store.users.iter().find(|u| u.id == user_id).cloned().map(Json).ok_or_else(|| not_found("user"))
}

async fn update_user(
    State(store): State<Shared>,
    Path(user_id): Path<String>,
    Json(body): Json<UserFields>,
) -> Result<Json<User>, MockError> {
    let mut store = store.lock().unwrap();
    let user = store.users.iter_mut().find(|u| u.id == user_id).ok_or_else(|| not_found("user"))?;
    user.email = body.email;
    user.name = body.name;
    Ok(Json(user.clone()))
}

async fn delete_user(State(store): State<Shared>, Path(user_id): Path<String>) -> Result<StatusCode, MockError> {
    let mut store = store.lock().unwrap();
    let before = store.users.len();
    store.users.retain(|u| u.id != user_id);
    if store.users.len() == before {
        return Err(not_found("user"));
    }
    Ok(StatusCode::NO_CONTENT)
}
