//! In-process fake of the notes service
//!
//! Serves the `/notes/api` surface the clients use, with the same response
//! envelope as the real service, and records every DELETE it receives so
//! tests can assert on cleanup order.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use practice_api::{ApiClient, ApiConfig, AUTH_HEADER};
use practice_e2e::{FixtureStore, PlaceholderReplacer, TestDataApi, TestDataProvider};

/// A DELETE call, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    Note(String),
    Account(String),
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: String,
    name: String,
    email: String,
    password: String,
}

impl StoredUser {
    fn to_json(&self) -> Value {
        json!({"id": self.id, "name": self.name, "email": self.email})
    }
}

#[derive(Debug, Clone)]
struct StoredNote {
    id: String,
    title: String,
    description: String,
    category: String,
    completed: bool,
    created_at: String,
    updated_at: String,
    user_id: String,
}

impl StoredNote {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "category": self.category,
            "completed": self.completed,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
            "user_id": self.user_id,
        })
    }
}

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    /// Keyed by email
    users: HashMap<String, StoredUser>,
    /// Token to email
    sessions: HashMap<String, String>,
    notes: BTreeMap<String, StoredNote>,
    deletions: Vec<Deletion>,
    healthy: bool,
    failing_note_creations: usize,
}

impl Store {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }
}

type SharedStore = Arc<Mutex<Store>>;

/// Running fake service. The server task is aborted on drop.
pub struct FakeService {
    addr: SocketAddr,
    store: SharedStore,
    task: JoinHandle<()>,
}

impl FakeService {
    pub async fn spawn() -> Self {
        let store: SharedStore = Arc::new(Mutex::new(Store {
            healthy: true,
            ..Default::default()
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake service");
        let addr = listener.local_addr().expect("fake service address");
        let app = router(Arc::clone(&store));

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, store, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig::default().with_base_url(self.base_url())
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.config()).expect("client for fake service")
    }

    pub fn test_data(&self) -> TestDataApi {
        TestDataApi::new(
            self.client(),
            TestDataProvider::new(PlaceholderReplacer::new(), FixtureStore::default()),
        )
    }

    pub fn deletions(&self) -> Vec<Deletion> {
        self.store.lock().deletions.clone()
    }

    pub fn note_count(&self) -> usize {
        self.store.lock().notes.len()
    }

    pub fn user_count(&self) -> usize {
        self.store.lock().users.len()
    }

    pub fn has_note(&self, id: &str) -> bool {
        self.store.lock().notes.contains_key(id)
    }

    /// Remove a note behind the clients' back
    pub fn drop_note(&self, id: &str) {
        self.store.lock().notes.remove(id);
    }

    /// Answer the next `n` note creations with 400
    pub fn fail_next_note_creations(&self, n: usize) {
        self.store.lock().failing_note_creations = n;
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.store.lock().healthy = healthy;
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(store: SharedStore) -> Router {
    let api = Router::new()
        .route("/health-check", get(health_check))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", delete(logout))
        .route("/users/profile", get(profile))
        .route("/users/change-password", post(change_password))
        .route("/users/delete-account", delete(delete_account))
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/:id",
            get(get_note).put(update_note).patch(patch_note).delete(delete_note),
        );

    Router::new().nest("/notes/api", api).with_state(store)
}

fn reply(status: StatusCode, message: &str, data: Option<Value>) -> Response {
    let mut body = json!({
        "success": status.is_success(),
        "status": status.as_u16(),
        "message": message,
    });
    if let Some(data) = data {
        body["data"] = data;
    }
    (status, Json(body)).into_response()
}

fn unauthorized() -> Response {
    reply(
        StatusCode::UNAUTHORIZED,
        "Access token is not valid or has expired, you will need to login",
        None,
    )
}

fn note_not_found() -> Response {
    reply(
        StatusCode::NOT_FOUND,
        "No note was found with the provided ID, Maybe it was deleted",
        None,
    )
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn session(store: &Store, headers: &HeaderMap) -> Option<StoredUser> {
    let token = headers.get(AUTH_HEADER)?.to_str().ok()?;
    let email = store.sessions.get(token)?;
    store.users.get(email).cloned()
}

fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

fn len_between(value: Option<&str>, min: usize, max: usize) -> bool {
    value.is_some_and(|v| (min..=max).contains(&v.chars().count()))
}

fn note_input_error(body: &Value) -> Option<&'static str> {
    if !len_between(str_field(body, "title"), 4, 100) {
        return Some("Title must be between 4 and 100 characters");
    }
    if !len_between(str_field(body, "description"), 4, 1000) {
        return Some("Description must be between 4 and 1000 characters");
    }
    if let Some(category) = body.get("category") {
        if !matches!(category.as_str(), Some("Home" | "Work" | "Personal")) {
            return Some("Category must be one of the categories: Home, Work, Personal");
        }
    }
    if body.get("completed").is_some_and(|c| !c.is_boolean()) {
        return Some("Note completed status must be boolean");
    }
    None
}

async fn health_check(State(store): State<SharedStore>) -> Response {
    if store.lock().healthy {
        reply(StatusCode::OK, "Notes API is Running", None)
    } else {
        reply(StatusCode::SERVICE_UNAVAILABLE, "Notes API is down", None)
    }
}

async fn register(State(store): State<SharedStore>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock();

    if !len_between(str_field(&body, "name"), 4, 30) {
        return reply(StatusCode::BAD_REQUEST, "User name must be between 4 and 30 characters", None);
    }
    let Some(email) = str_field(&body, "email").filter(|e| e.contains('@')) else {
        return reply(StatusCode::BAD_REQUEST, "A valid email address is required", None);
    };
    if !len_between(str_field(&body, "password"), 6, 30) {
        return reply(StatusCode::BAD_REQUEST, "Password must be between 6 and 30 characters", None);
    }
    if store.users.contains_key(email) {
        return reply(
            StatusCode::CONFLICT,
            "An account already exists with the same email address",
            None,
        );
    }

    let user = StoredUser {
        id: store.next_id(),
        name: str_field(&body, "name").unwrap_or_default().to_string(),
        email: email.to_string(),
        password: str_field(&body, "password").unwrap_or_default().to_string(),
    };
    let data = user.to_json();
    store.users.insert(user.email.clone(), user);
    reply(StatusCode::CREATED, "User account created successfully", Some(data))
}

async fn login(State(store): State<SharedStore>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock();

    let user = str_field(&body, "email")
        .and_then(|email| store.users.get(email))
        .filter(|user| str_field(&body, "password") == Some(user.password.as_str()))
        .cloned();
    let Some(user) = user else {
        return reply(StatusCode::UNAUTHORIZED, "Incorrect email address or password", None);
    };

    let token = uuid::Uuid::new_v4().simple().to_string();
    store.sessions.insert(token.clone(), user.email.clone());

    let mut data = user.to_json();
    data["token"] = json!(token);
    reply(StatusCode::OK, "Login successful", Some(data))
}

async fn logout(State(store): State<SharedStore>, headers: HeaderMap) -> Response {
    let mut store = store.lock();
    if session(&store, &headers).is_none() {
        return unauthorized();
    }
    if let Some(token) = headers.get(AUTH_HEADER).and_then(|t| t.to_str().ok()) {
        store.sessions.remove(token);
    }
    reply(StatusCode::OK, "User has been successfully logged out", None)
}

async fn profile(State(store): State<SharedStore>, headers: HeaderMap) -> Response {
    let store = store.lock();
    match session(&store, &headers) {
        Some(user) => reply(StatusCode::OK, "Profile successful", Some(user.to_json())),
        None => unauthorized(),
    }
}

async fn change_password(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock();
    let Some(user) = session(&store, &headers) else {
        return unauthorized();
    };
    if str_field(&body, "currentPassword") != Some(user.password.as_str()) {
        return reply(StatusCode::BAD_REQUEST, "The current password is incorrect", None);
    }
    let Some(new_password) = str_field(&body, "newPassword").filter(|p| len_between(Some(*p), 6, 30)) else {
        return reply(StatusCode::BAD_REQUEST, "New password must be between 6 and 30 characters", None);
    };
    if let Some(stored) = store.users.get_mut(&user.email) {
        stored.password = new_password.to_string();
    }
    reply(StatusCode::OK, "The password was successfully updated", None)
}

async fn delete_account(State(store): State<SharedStore>, headers: HeaderMap) -> Response {
    let mut store = store.lock();
    let Some(user) = session(&store, &headers) else {
        store.deletions.push(Deletion::Account(String::new()));
        return unauthorized();
    };

    store.deletions.push(Deletion::Account(user.email.clone()));
    store.users.remove(&user.email);
    store.sessions.retain(|_, email| *email != user.email);
    store.notes.retain(|_, note| note.user_id != user.id);
    reply(StatusCode::OK, "Account successfully deleted", None)
}

/// `search` matches title or description case-insensitively, `completed` is
/// `true`/`false`, `from`/`to` bound `created_at` inclusively
fn note_matches(note: &StoredNote, query: &HashMap<String, String>) -> bool {
    if let Some(term) = query.get("search") {
        let term = term.to_lowercase();
        if !note.title.to_lowercase().contains(&term) && !note.description.to_lowercase().contains(&term) {
            return false;
        }
    }
    if let Some(completed) = query.get("completed") {
        if completed.parse::<bool>().ok() != Some(note.completed) {
            return false;
        }
    }
    let Ok(created_at) = DateTime::parse_from_rfc3339(&note.created_at) else {
        return false;
    };
    let bound = |key: &str| query.get(key).and_then(|v| DateTime::parse_from_rfc3339(v).ok());
    if bound("from").is_some_and(|from| created_at < from) {
        return false;
    }
    if bound("to").is_some_and(|to| created_at > to) {
        return false;
    }
    true
}

async fn list_notes(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = store.lock();
    let Some(user) = session(&store, &headers) else {
        return unauthorized();
    };
    let notes: Vec<Value> = store
        .notes
        .values()
        .filter(|note| note.user_id == user.id && note_matches(note, &query))
        .map(StoredNote::to_json)
        .collect();
    let message = format!("Notes successfully retrieved: {}", notes.len());
    reply(StatusCode::OK, &message, Some(Value::Array(notes)))
}

async fn create_note(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock();
    let Some(user) = session(&store, &headers) else {
        return unauthorized();
    };
    if store.failing_note_creations > 0 {
        store.failing_note_creations -= 1;
        return reply(StatusCode::BAD_REQUEST, "Note creation rejected", None);
    }
    if let Some(message) = note_input_error(&body) {
        return reply(StatusCode::BAD_REQUEST, message, None);
    }

    let timestamp = now();
    let note = StoredNote {
        id: store.next_id(),
        title: str_field(&body, "title").unwrap_or_default().to_string(),
        description: str_field(&body, "description").unwrap_or_default().to_string(),
        category: str_field(&body, "category").unwrap_or("Personal").to_string(),
        completed: body.get("completed").and_then(Value::as_bool).unwrap_or(false),
        created_at: timestamp.clone(),
        updated_at: timestamp,
        user_id: user.id,
    };
    let data = note.to_json();
    store.notes.insert(note.id.clone(), note);
    reply(StatusCode::OK, "Note successfully created", Some(data))
}

fn owned_note(store: &Store, user: &StoredUser, id: &str) -> Option<StoredNote> {
    store
        .notes
        .get(id)
        .filter(|note| note.user_id == user.id)
        .cloned()
}

async fn get_note(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let store = store.lock();
    let Some(user) = session(&store, &headers) else {
        return unauthorized();
    };
    match owned_note(&store, &user, &id) {
        Some(note) => reply(StatusCode::OK, "Note successfully retrieved", Some(note.to_json())),
        None => note_not_found(),
    }
}

fn apply_update(store: &mut Store, mut note: StoredNote, body: &Value) -> Value {
    if let Some(title) = str_field(body, "title") {
        note.title = title.to_string();
    }
    if let Some(description) = str_field(body, "description") {
        note.description = description.to_string();
    }
    if let Some(category) = str_field(body, "category") {
        note.category = category.to_string();
    }
    if let Some(completed) = body.get("completed").and_then(Value::as_bool) {
        note.completed = completed;
    }
    note.updated_at = now();
    let data = note.to_json();
    store.notes.insert(note.id.clone(), note);
    data
}

async fn update_note(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock();
    let Some(user) = session(&store, &headers) else {
        return unauthorized();
    };
    let Some(note) = owned_note(&store, &user, &id) else {
        return note_not_found();
    };
    if let Some(message) = note_input_error(&body) {
        return reply(StatusCode::BAD_REQUEST, message, None);
    }
    let data = apply_update(&mut store, note, &body);
    reply(StatusCode::OK, "Note successfully Updated", Some(data))
}

async fn patch_note(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock();
    let Some(user) = session(&store, &headers) else {
        return unauthorized();
    };
    let Some(note) = owned_note(&store, &user, &id) else {
        return note_not_found();
    };
    if body.get("completed").is_some_and(|c| !c.is_boolean()) {
        return reply(StatusCode::BAD_REQUEST, "Note completed status must be boolean", None);
    }
    let data = apply_update(&mut store, note, &body);
    reply(StatusCode::OK, "Note successfully Updated", Some(data))
}

async fn delete_note(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut store = store.lock();
    store.deletions.push(Deletion::Note(id.clone()));
    let Some(user) = session(&store, &headers) else {
        return unauthorized();
    };
    if owned_note(&store, &user, &id).is_none() {
        return note_not_found();
    }
    store.notes.remove(&id);
    reply(StatusCode::OK, "Note successfully deleted", None)
}
