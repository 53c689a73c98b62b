//! In-memory stand-in for the book-tracking backend.
//!
//! Implements the REST contract the client depends on: token auth, profile,
//! and book CRUD, with the same envelope and error shapes as the real
//! service (`error` arrays on create, `errors` objects on update and auth).

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
}

#[derive(Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub email: String,
    pub name: String,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    sessions: HashMap<String, String>,
    books: Vec<Book>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/profile", get(profile))
        .route("/api/books", get(list_books).post(create_book))
        .route(
            "/api/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn failure(status: StatusCode, message: &str) -> Reply {
    reply(status, json!({ "success": false, "message": message }))
}

fn field_map(errors: &[(&str, &str)]) -> Value {
    let map: Map<String, Value> = errors
        .iter()
        .map(|(field, msg)| (field.to_string(), Value::String(msg.to_string())))
        .collect();
    Value::Object(map)
}

/// Resolve the bearer token to a username.
async fn authenticate(db: &Db, headers: &HeaderMap) -> Result<String, Reply> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let store = db.read().await;
    token
        .and_then(|t| store.sessions.get(t).cloned())
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

fn validate_book(input: &BookInput) -> Vec<(&'static str, &'static str)> {
    let mut errors = Vec::new();
    if input.title.trim().chars().count() < 3 {
        errors.push(("title", "Title must be at least 3 characters"));
    }
    if input.author.trim().chars().count() < 3 {
        errors.push(("author", "Author must be at least 3 characters"));
    }
    if input.description.trim().chars().count() < 10 {
        errors.push(("description", "Description must be at least 10 characters"));
    }
    if input.genre.trim().is_empty() {
        errors.push(("genre", "Genre is required"));
    }
    errors
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> Reply {
    let mut errors = Vec::new();
    if input.username.trim().chars().count() < 3 {
        errors.push(("username", "Username must be at least 3 characters"));
    }
    if !input.email.contains('@') {
        errors.push(("email", "Email is invalid"));
    }
    if input.password.chars().count() < 6 {
        errors.push(("password", "Password must be at least 6 characters"));
    }

    let mut store = db.write().await;
    if store.users.contains_key(input.username.trim()) {
        errors.push(("username", "Username already exists"));
    }
    if !errors.is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "message": "Validation failed", "errors": field_map(&errors) }),
        );
    }

    let user = User {
        username: input.username.trim().to_string(),
        password: input.password,
        email: input.email.trim().to_lowercase(),
        name: input.name.trim().to_string(),
    };
    store.users.insert(user.username.clone(), user.clone());
    tracing::info!(username = %user.username, "user registered");
    reply(
        StatusCode::CREATED,
        json!({ "success": true, "message": "User registered successfully", "data": user }),
    )
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Reply {
    let mut store = db.write().await;
    let Some(user) = store.users.get(&input.username).cloned() else {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({ "success": false, "message": "Invalid credentials", "errors": { "username": "User not found" } }),
        );
    };
    if user.password != input.password {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({ "success": false, "message": "Invalid credentials", "errors": { "password": "Incorrect password" } }),
        );
    }
    let token = Uuid::new_v4().simple().to_string();
    store.sessions.insert(token.clone(), user.username.clone());
    reply(
        StatusCode::OK,
        json!({ "success": true, "data": { "token": token, "user": user } }),
    )
}

async fn profile(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let username = match authenticate(&db, &headers).await {
        Ok(username) => username,
        Err(reply) => return reply,
    };
    let store = db.read().await;
    match store.users.get(&username) {
        Some(user) => reply(StatusCode::OK, json!({ "success": true, "data": user })),
        None => failure(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn list_books(State(db): State<Db>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authenticate(&db, &headers).await {
        return reply;
    }
    let store = db.read().await;
    reply(StatusCode::OK, json!({ "success": true, "data": store.books }))
}

async fn get_book(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if let Err(reply) = authenticate(&db, &headers).await {
        return reply;
    }
    let store = db.read().await;
    match store.books.iter().find(|b| b.id == id) {
        Some(book) => reply(StatusCode::OK, json!({ "success": true, "data": book })),
        None => failure(StatusCode::NOT_FOUND, "Book not found"),
    }
}

async fn create_book(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<BookInput>,
) -> Reply {
    if let Err(reply) = authenticate(&db, &headers).await {
        return reply;
    }
    let errors = validate_book(&input);
    if !errors.is_empty() {
        let messages: Vec<&str> = errors.iter().map(|(_, msg)| *msg).collect();
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "error": messages }),
        );
    }
    let book = Book {
        id: Uuid::new_v4().simple().to_string(),
        title: input.title.trim().to_string(),
        author: input.author.trim().to_string(),
        description: input.description.trim().to_string(),
        genre: input.genre.trim().to_string(),
    };
    db.write().await.books.push(book.clone());
    reply(StatusCode::CREATED, json!({ "success": true, "data": book }))
}

async fn update_book(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<BookInput>,
) -> Reply {
    if let Err(reply) = authenticate(&db, &headers).await {
        return reply;
    }
    let mut store = db.write().await;
    let Some(book) = store.books.iter_mut().find(|b| b.id == id) else {
        return failure(StatusCode::NOT_FOUND, "Book not found");
    };
    let errors = validate_book(&input);
    if !errors.is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "message": "Validation failed", "errors": field_map(&errors) }),
        );
    }
    book.title = input.title.trim().to_string();
    book.author = input.author.trim().to_string();
    book.description = input.description.trim().to_string();
    book.genre = input.genre.trim().to_string();
    reply(StatusCode::OK, json!({ "success": true, "data": book.clone() }))
}

async fn delete_book(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if let Err(reply) = authenticate(&db, &headers).await {
        return reply;
    }
    let mut store = db.write().await;
    let before = store.books.len();
    store.books.retain(|b| b.id != id);
    if store.books.len() == before {
        return failure(StatusCode::NOT_FOUND, "Book not found");
    }
    reply(
        StatusCode::OK,
        json!({ "success": true, "message": "Book deleted successfully" }),
    )
}
