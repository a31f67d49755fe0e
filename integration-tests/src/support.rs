//! In-process mock of the board backend.
//!
//! Keeps users, shows and comments in memory and applies the backend's
//! comment visibility rule: the show owner sees everything, anyone else sees
//! public comments plus their own. Lists come back newest first.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Default)]
struct Db {
    users: Vec<Value>,
    shows: Vec<Value>,
    comments: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct MockBoard {
    db: Arc<Mutex<Db>>,
    requests: Arc<AtomicUsize>,
    text_shows: Arc<AtomicBool>,
    /// Show whose comment listing answers 500; 0 means none.
    broken_comments: Arc<AtomicU64>,
}

impl MockBoard {
    /// Number of requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make `GET /shows` answer with plain text instead of JSON.
    pub fn serve_shows_as_text(&self, on: bool) {
        self.text_shows.store(on, Ordering::SeqCst);
    }

    /// Make `GET /shows/{show_id}/comments` fail with a server error.
    pub fn fail_comments_for(&self, show_id: u64) {
        self.broken_comments.store(show_id, Ordering::SeqCst);
    }

    pub fn seed_user(&self, user_id: &str, user_name: &str) {
        self.lock().users.push(json!({ "user_id": user_id, "user_name": user_name }));
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Db> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn router(&self) -> Router {
        let api = Router::new()
            .route("/users/register", post(register))
            .route("/users/by-name", get(users_by_name))
            .route("/users/{user_id}", get(get_user))
            .route("/shows", get(list_shows).post(create_show))
            .route("/shows/search", get(search_shows))
            .route("/shows/{show_id}/comments", get(list_comments).post(add_comment))
            .route("/healthz", get(healthz));
        Router::new().nest("/api", api).with_state(self.clone())
    }
}

/// Serve a fresh mock on an ephemeral port. Returns the handle and the API
/// base URL (`http://127.0.0.1:<port>/api`).
pub async fn spawn_board() -> (MockBoard, String) {
    let board = MockBoard::default();
    let app = board.router();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock board");
    let addr: SocketAddr = listener.local_addr().expect("mock board address");
    tokio::spawn(async move { axum::serve(listener, app.into_make_service()).await.expect("mock board") });
    (board, format!("http://{addr}/api"))
}

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}

fn unprocessable(detail: &str) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": detail }))).into_response()
}

fn newest_first(mut rows: Vec<Value>) -> Vec<Value> {
    rows.sort_by_key(|r| std::cmp::Reverse(r["id"].as_u64().unwrap_or(0)));
    rows
}

fn non_empty(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

async fn register(State(board): State<MockBoard>, Json(body): Json<Value>) -> Response {
    board.hit();
    let Some(user_name) = non_empty(&body, "user_name") else { return unprocessable("user_name required") };
    let mut db = board.lock();
    let user = json!({ "user_id": format!("u-{}", db.users.len() + 1), "user_name": user_name });
    db.users.push(user.clone());
    Json(user).into_response()
}

async fn get_user(State(board): State<MockBoard>, Path(user_id): Path<String>) -> Response {
    board.hit();
    let db = board.lock();
    match db.users.iter().find(|u| u["user_id"] == user_id.as_str()) {
        Some(user) => Json(user.clone()).into_response(),
        None => not_found("user_not_found"),
    }
}

#[derive(Deserialize)]
struct ByName {
    user_name: String,
}

async fn users_by_name(State(board): State<MockBoard>, Query(q): Query<ByName>) -> Json<Vec<Value>> {
    board.hit();
    let name = q.user_name.trim();
    Json(board.lock().users.iter().filter(|u| u["user_name"] == name).cloned().collect())
}

async fn list_shows(State(board): State<MockBoard>) -> Response {
    board.hit();
    if board.text_shows.load(Ordering::SeqCst) {
        return ([(header::CONTENT_TYPE, "text/plain")], "maintenance").into_response();
    }
    Json(newest_first(board.lock().shows.clone())).into_response()
}

async fn create_show(State(board): State<MockBoard>, Json(body): Json<Value>) -> Response {
    board.hit();
    let fields = ["user_id", "user_name", "tix_name", "show_name"];
    if fields.iter().any(|f| non_empty(&body, f).is_none()) {
        return unprocessable("missing show field");
    }
    let mut db = board.lock();
    let mut show = body;
    show["id"] = json!(db.shows.len() as u64 + 1);
    show["created_at"] = json!("2024-01-01T00:00:00Z");
    db.shows.push(show.clone());
    Json(show).into_response()
}

#[derive(Deserialize)]
struct Search {
    name: String,
    #[serde(default = "owner")]
    field: String,
    #[serde(default = "yes")]
    exact: bool,
}

fn owner() -> String {
    "owner".into()
}

fn yes() -> bool {
    true
}

async fn search_shows(State(board): State<MockBoard>, Query(q): Query<Search>) -> Json<Vec<Value>> {
    board.hit();
    let key = if q.field == "owner" { "user_name" } else { "tix_name" };
    let name = q.name.trim();
    let found = board
        .lock()
        .shows
        .iter()
        .filter(|s| {
            let v = s[key].as_str().unwrap_or_default();
            if q.exact {
                v == name
            } else {
                v.contains(name)
            }
        })
        .cloned()
        .collect();
    Json(newest_first(found))
}

#[derive(Deserialize)]
struct Viewer {
    viewer_name: Option<String>,
    viewer_user_id: Option<String>,
}

async fn list_comments(
    State(board): State<MockBoard>,
    Path(show_id): Path<u64>,
    Query(viewer): Query<Viewer>,
) -> Response {
    board.hit();
    if board.broken_comments.load(Ordering::SeqCst) == show_id {
        return (StatusCode::INTERNAL_SERVER_ERROR, "comment store unavailable").into_response();
    }
    let db = board.lock();
    let Some(show) = db.shows.iter().find(|s| s["id"] == show_id) else { return not_found("show_not_found") };
    let name = viewer.viewer_name.as_deref().filter(|s| !s.is_empty());
    let uid = viewer.viewer_user_id.as_deref().filter(|s| !s.is_empty());
    let is_owner = name.is_some_and(|n| show["user_name"] == n) || uid.is_some_and(|u| show["user_id"] == u);
    let is_author = |c: &Value| {
        uid.is_some_and(|u| c["author_user_id"] == u) || name.is_some_and(|n| c["author_name"] == n)
    };
    let visible = db
        .comments
        .iter()
        .filter(|c| c["show_id"] == show_id)
        .filter(|c| is_owner || c["visibility"] == "public" || is_author(c))
        .cloned()
        .collect();
    Json(newest_first(visible)).into_response()
}

async fn add_comment(State(board): State<MockBoard>, Path(show_id): Path<u64>, Json(body): Json<Value>) -> Response {
    board.hit();
    let mut db = board.lock();
    if !db.shows.iter().any(|s| s["id"] == show_id) {
        return not_found("show_not_found");
    }
    if non_empty(&body, "author_name").is_none() || non_empty(&body, "content").is_none() {
        return unprocessable("author_name and content required");
    }
    let visibility = body.get("visibility").and_then(Value::as_str).unwrap_or("public");
    if visibility != "public" && visibility != "private" {
        return unprocessable("visibility must be public or private");
    }
    let mut comment = body.clone();
    comment["visibility"] = json!(visibility);
    comment["id"] = json!(db.comments.len() as u64 + 1);
    comment["show_id"] = json!(show_id);
    comment["created_at"] = json!("2024-01-01T00:00:00Z");
    db.comments.push(comment.clone());
    Json(comment).into_response()
}

async fn healthz(State(board): State<MockBoard>) -> Json<Value> {
    board.hit();
    Json(json!({ "status": "ok" }))
}
